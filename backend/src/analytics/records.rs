//! Personal-record detection.
//!
//! Three maxima are tracked per exercise title: Epley estimated 1RM
//! (`weight * (1 + reps / 30)`), heaviest weight and most reps. A set that
//! strictly beats a maximum is one PR event for that metric. Sets without a
//! positive weight (bodyweight, assisted) can only beat the reps maximum.
//!
//! Detection needs every earlier set to have been seen, so workouts are always
//! walked oldest first whatever order the caller passes them in.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::saturating_count;
use crate::models::{Workout, WorkoutSet};

/// Which maximum a PR beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrKind {
    OneRepMax,
    Weight,
    Reps,
}

/// Bucket size for the PR timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrPeriod {
    /// One entry per workout.
    #[default]
    Workout,
    /// Monday-anchored weeks.
    Week,
    Month,
}

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrPoint {
    /// `YYYY-MM-DD` (workout or week start) or `YYYY-MM`.
    pub date: String,
    pub count: u32,
}

/// A single record-breaking set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrEvent {
    pub date: String,
    pub workout_id: String,
    pub workout_title: String,
    pub exercise: String,
    pub kind: PrKind,
    pub value: f64,
    /// Maximum before this set; 0 for the first observation.
    pub previous: f64,
}

/// Best values per exercise at the end of the history.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBest {
    pub exercise: String,
    pub one_rep_max: f64,
    pub weight: f64,
    pub reps: u32,
}

/// Epley estimated one-rep max.
pub fn estimated_one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + f64::from(reps) / 30.0)
}

#[derive(Debug, Clone, Copy, Default)]
struct Maxima {
    one_rep_max: f64,
    weight: f64,
    reps: u32,
}

/// Running per-exercise maxima. Feed sets in chronological order.
#[derive(Debug, Default)]
pub struct PrTracker {
    maxima: HashMap<String, Maxima>,
    order: Vec<String>,
}

impl PrTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one set, returning each beaten maximum with `(kind, new, previous)`.
    pub fn observe(&mut self, exercise: &str, set: &WorkoutSet) -> Vec<(PrKind, f64, f64)> {
        let reps = match set.reps {
            Some(r) if r > 0 => r,
            _ => return Vec::new(),
        };
        let weight = set.weight_kg.unwrap_or(0.0);

        if !self.maxima.contains_key(exercise) {
            self.order.push(exercise.to_string());
        }
        let max = self.maxima.entry(exercise.to_string()).or_default();
        let mut events = Vec::new();

        if weight > 0.0 {
            let e1rm = estimated_one_rep_max(weight, reps);
            if e1rm > max.one_rep_max {
                events.push((PrKind::OneRepMax, e1rm, max.one_rep_max));
                max.one_rep_max = e1rm;
            }
            if weight > max.weight {
                events.push((PrKind::Weight, weight, max.weight));
                max.weight = weight;
            }
        }

        if reps > max.reps {
            events.push((PrKind::Reps, f64::from(reps), f64::from(max.reps)));
            max.reps = reps;
        }

        events
    }

    /// Current maxima in first-seen order.
    pub fn bests(&self) -> Vec<PersonalBest> {
        self.order
            .iter()
            .filter_map(|name| {
                self.maxima.get(name).map(|m| PersonalBest {
                    exercise: name.clone(),
                    one_rep_max: m.one_rep_max,
                    weight: m.weight,
                    reps: m.reps,
                })
            })
            .collect()
    }
}

fn chronological(workouts: &[Workout]) -> Vec<&Workout> {
    let mut ordered: Vec<&Workout> = workouts.iter().collect();
    ordered.sort_by_key(|w| w.start_time);
    ordered
}

fn workout_date(workout: &Workout) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(workout.start_time, 0)
        .unwrap_or_default()
        .date_naive()
}

fn bucket_label(date: NaiveDate, period: PrPeriod) -> String {
    match period {
        PrPeriod::Workout => date.format("%Y-%m-%d").to_string(),
        PrPeriod::Week => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            monday.format("%Y-%m-%d").to_string()
        }
        PrPeriod::Month => date.format("%Y-%m").to_string(),
    }
}

/// Every PR event, oldest first.
pub fn personal_record_events(workouts: &[Workout]) -> Vec<PrEvent> {
    let mut tracker = PrTracker::new();
    let mut events = Vec::new();

    for workout in chronological(workouts) {
        let date = bucket_label(workout_date(workout), PrPeriod::Workout);
        for (exercise, set) in workout.sets() {
            for (kind, value, previous) in tracker.observe(&exercise.title, set) {
                events.push(PrEvent {
                    date: date.clone(),
                    workout_id: workout.id.clone(),
                    workout_title: workout.title.clone(),
                    exercise: exercise.title.clone(),
                    kind,
                    value,
                    previous,
                });
            }
        }
    }

    events
}

/// Final maxima per exercise, in the order exercises first appeared.
pub fn personal_bests(workouts: &[Workout]) -> Vec<PersonalBest> {
    let mut tracker = PrTracker::new();
    for workout in chronological(workouts) {
        for (exercise, set) in workout.sets() {
            tracker.observe(&exercise.title, set);
        }
    }
    tracker.bests()
}

/// PR counts over time. Entries with no PRs are left out; output is ascending by date.
pub fn prs_over_time(workouts: &[Workout], period: PrPeriod) -> Vec<PrPoint> {
    let mut tracker = PrTracker::new();
    let mut per_workout = Vec::new();

    for workout in chronological(workouts) {
        let count: usize = workout
            .sets()
            .map(|(exercise, set)| tracker.observe(&exercise.title, set).len())
            .sum();
        if count > 0 {
            per_workout.push(PrPoint {
                date: bucket_label(workout_date(workout), period),
                count: saturating_count(count),
            });
        }
    }

    match period {
        PrPeriod::Workout => {
            per_workout.sort_by(|a, b| a.date.cmp(&b.date));
            per_workout
        }
        PrPeriod::Week | PrPeriod::Month => {
            let mut buckets: BTreeMap<String, u32> = BTreeMap::new();
            for point in per_workout {
                let total = buckets.entry(point.date).or_insert(0);
                *total = total.saturating_add(point.count);
            }
            buckets
                .into_iter()
                .map(|(date, count)| PrPoint { date, count })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap().timestamp()
    }

    fn set(weight: Option<f64>, reps: Option<u32>) -> WorkoutSet {
        WorkoutSet {
            weight_kg: weight,
            reps,
            ..Default::default()
        }
    }

    fn workout(id: &str, start: i64, exercise: &str, sets: Vec<WorkoutSet>) -> Workout {
        let mut w = Workout::new(id.into(), id.into(), start);
        let mut e = Exercise::new(exercise.into());
        e.sets = sets;
        w.exercises.push(e);
        w
    }

    #[test]
    fn test_epley() {
        assert!((estimated_one_rep_max(100.0, 10) - 133.333).abs() < 0.01);
        assert!((estimated_one_rep_max(110.0, 5) - 128.333).abs() < 0.01);
    }

    #[test]
    fn test_heavier_lower_rep_set_is_weight_pr_only() {
        let mut tracker = PrTracker::new();
        let first = tracker.observe("Squat", &set(Some(100.0), Some(10)));
        assert_eq!(first.len(), 3);

        let second = tracker.observe("Squat", &set(Some(110.0), Some(5)));
        let kinds: Vec<PrKind> = second.iter().map(|(k, _, _)| *k).collect();
        assert_eq!(kinds, vec![PrKind::Weight]);
        assert_eq!(second[0].1, 110.0);
        assert_eq!(second[0].2, 100.0);
    }

    #[test]
    fn test_bodyweight_counts_reps_only() {
        let mut tracker = PrTracker::new();
        let events = tracker.observe("Pull Up", &set(None, Some(12)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, PrKind::Reps);

        let zero = tracker.observe("Pull Up", &set(Some(0.0), Some(13)));
        assert_eq!(zero.len(), 1);
        assert_eq!(zero[0].0, PrKind::Reps);
    }

    #[test]
    fn test_equal_is_not_a_pr() {
        let mut tracker = PrTracker::new();
        tracker.observe("Row", &set(Some(80.0), Some(8)));
        assert!(tracker.observe("Row", &set(Some(80.0), Some(8))).is_empty());
        assert!(tracker.observe("Row", &set(Some(80.0), None)).is_empty());
        assert!(tracker.observe("Row", &set(Some(200.0), Some(0))).is_empty());
    }

    #[test]
    fn test_maxima_are_per_exercise() {
        let mut tracker = PrTracker::new();
        tracker.observe("Squat", &set(Some(150.0), Some(5)));
        assert_eq!(tracker.observe("Bench Press", &set(Some(80.0), Some(5))).len(), 3);
    }

    #[test]
    fn test_timeline_processes_oldest_first_regardless_of_input_order() {
        // newest first, as the builder returns them
        let workouts = vec![
            workout("b", ts(2024, 1, 8), "Squat", vec![set(Some(110.0), Some(5))]),
            workout("a", ts(2024, 1, 1), "Squat", vec![set(Some(100.0), Some(10))]),
        ];

        let timeline = prs_over_time(&workouts, PrPeriod::Workout);
        assert_eq!(
            timeline,
            vec![
                PrPoint { date: "2024-01-01".into(), count: 3 },
                PrPoint { date: "2024-01-08".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_workouts_without_prs_are_omitted() {
        let workouts = vec![
            workout("a", ts(2024, 1, 1), "Squat", vec![set(Some(100.0), Some(5))]),
            workout("b", ts(2024, 1, 3), "Squat", vec![set(Some(90.0), Some(5))]),
        ];
        let timeline = prs_over_time(&workouts, PrPeriod::Workout);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].date, "2024-01-01");
    }

    #[test]
    fn test_weekly_buckets_are_monday_anchored() {
        // 2024-01-03 is a Wednesday, 2024-01-07 a Sunday, 2024-01-08 a Monday
        let workouts = vec![
            workout("a", ts(2024, 1, 3), "Squat", vec![set(Some(100.0), Some(5))]),
            workout("b", ts(2024, 1, 7), "Squat", vec![set(Some(105.0), Some(5))]),
            workout("c", ts(2024, 1, 8), "Squat", vec![set(Some(110.0), Some(5))]),
        ];

        let weekly = prs_over_time(&workouts, PrPeriod::Week);
        assert_eq!(
            weekly,
            vec![
                PrPoint { date: "2024-01-01".into(), count: 5 },
                PrPoint { date: "2024-01-08".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_monthly_buckets() {
        let workouts = vec![
            workout("a", ts(2024, 1, 30), "Squat", vec![set(Some(100.0), Some(5))]),
            workout("b", ts(2024, 2, 2), "Squat", vec![set(Some(105.0), Some(5))]),
            workout("c", ts(2024, 2, 20), "Squat", vec![set(Some(107.5), Some(6))]),
        ];

        let monthly = prs_over_time(&workouts, PrPeriod::Month);
        assert_eq!(
            monthly,
            vec![
                PrPoint { date: "2024-01".into(), count: 3 },
                PrPoint { date: "2024-02".into(), count: 5 },
            ]
        );
    }

    #[test]
    fn test_events_and_bests() {
        let workouts = vec![
            workout("b", ts(2024, 1, 8), "Squat", vec![set(Some(110.0), Some(5))]),
            workout("a", ts(2024, 1, 1), "Squat", vec![set(Some(100.0), Some(10))]),
        ];

        let events = personal_record_events(&workouts);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].workout_id, "a");
        assert_eq!(events[3].kind, PrKind::Weight);
        assert_eq!(events[3].date, "2024-01-08");

        let bests = personal_bests(&workouts);
        assert_eq!(bests.len(), 1);
        assert_eq!(bests[0].weight, 110.0);
        assert_eq!(bests[0].reps, 10);
        assert!((bests[0].one_rep_max - 133.333).abs() < 0.01);
    }

    #[test]
    fn test_empty_collection() {
        assert!(prs_over_time(&[], PrPeriod::Week).is_empty());
        assert!(personal_record_events(&[]).is_empty());
        assert!(personal_bests(&[]).is_empty());
    }
}
