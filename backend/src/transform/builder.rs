//! Fold flat workout rows into the Workout → Exercise → Set tree.
//!
//! # Architecture
//!
//! ```text
//! CSV rows (one per set)                       Workout tree
//! ┌──────────────────────────────────────┐    ┌──────────────────────────┐
//! │ Push, 16 Dez 2025, Bench Press, 1    │    │ Push (16 Dec 2025)       │
//! │ Push, 16 Dez 2025, Bench Press, 2    │ →  │  ├ Bench Press [1, 2]    │
//! │ Push, 16 Dez 2025, Dips, 1           │    │  └ Dips [1]              │
//! │ Legs, 18 Dez 2025, Squat, 1          │    │ Legs (18 Dec 2025)       │
//! └──────────────────────────────────────┘    │  └ Squat [1]             │
//!                                             └──────────────────────────┘
//! ```
//!
//! Rows sharing the raw `title + start_time` string land in the same workout.
//! The key is not normalized: two spellings of the same instant are two workouts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::dates::{normalize_date, DateOutcome};
use crate::models::{sort_newest_first, Workout, WorkoutRow, WorkoutSet};
use crate::parser::SkippedRow;

/// What to do with a timestamp that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// Substitute the parse's "now" instant and record the fallback.
    #[default]
    Lenient,
    /// Skip the row.
    Strict,
}

/// A timestamp that was replaced by the fallback instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFallback {
    pub line: usize,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

/// Output of [`WorkoutTreeBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    /// Newest first.
    pub workouts: Vec<Workout>,
    /// Rows dropped under [`DatePolicy::Strict`].
    pub skipped: Vec<SkippedRow>,
    pub date_fallbacks: Vec<DateFallback>,
}

/// Stateful row folder. One builder serves one parse.
pub struct WorkoutTreeBuilder {
    policy: DatePolicy,
    now: DateTime<Utc>,
    index: HashMap<String, usize>,
    workouts: Vec<Workout>,
    skipped: Vec<SkippedRow>,
    date_fallbacks: Vec<DateFallback>,
}

impl WorkoutTreeBuilder {
    pub fn new(policy: DatePolicy) -> Self {
        Self::with_clock(policy, Utc::now())
    }

    /// Use a fixed fallback instant instead of the wall clock.
    pub fn with_clock(policy: DatePolicy, now: DateTime<Utc>) -> Self {
        Self {
            policy,
            now,
            index: HashMap::new(),
            workouts: Vec::new(),
            skipped: Vec::new(),
            date_fallbacks: Vec::new(),
        }
    }

    /// Fold one row into the tree.
    pub fn push(&mut self, row: WorkoutRow) {
        let key = format!("{}{}", row.title, row.start_time);

        let existing = self.index.get(&key).copied();
        let idx = match existing {
            Some(idx) => idx,
            None => match self.open_workout(&row) {
                Some(workout) => {
                    self.workouts.push(workout);
                    let idx = self.workouts.len() - 1;
                    self.index.insert(key, idx);
                    idx
                }
                None => return,
            },
        };

        let set = build_set(&row);
        let volume = set.volume();
        let workout = &mut self.workouts[idx];

        let exercise = workout.exercise_mut(&row.exercise_title);
        if exercise.sets.is_empty() {
            exercise.notes = clean_text(&row.exercise_notes);
            exercise.superset_id = clean_text(&row.superset_id);
        }
        exercise.sets.push(set);

        if let Some(volume) = volume {
            workout.estimated_volume_kg += volume;
        }
    }

    /// Finish the parse. Workouts come back newest first.
    pub fn build(self) -> BuildOutput {
        let mut workouts = self.workouts;
        sort_newest_first(&mut workouts);

        BuildOutput {
            workouts,
            skipped: self.skipped,
            date_fallbacks: self.date_fallbacks,
        }
    }

    fn open_workout(&mut self, row: &WorkoutRow) -> Option<Workout> {
        let start = self.resolve_date(row, "start_time", &row.start_time)?;
        let end = if row.end_time.trim().is_empty() {
            None
        } else {
            Some(self.resolve_date(row, "end_time", &row.end_time)?)
        };

        let id = format!("{}-{}-{}", slugify(&row.title), start.timestamp(), self.workouts.len());
        let mut workout = Workout::new(id, row.title.clone(), start.timestamp());
        workout.end_time = end.map(|dt| dt.timestamp());
        workout.description = clean_text(&row.description);

        Some(workout)
    }

    fn resolve_date(
        &mut self,
        row: &WorkoutRow,
        field: &'static str,
        value: &str,
    ) -> Option<DateTime<Utc>> {
        let outcome = normalize_date(value);

        if let DateOutcome::Fallback(err) = &outcome {
            match self.policy {
                DatePolicy::Lenient => self.date_fallbacks.push(DateFallback {
                    line: row.line,
                    field,
                    value: value.to_string(),
                    reason: err.reason.clone(),
                }),
                DatePolicy::Strict => {
                    self.skipped.push(SkippedRow {
                        line: row.line,
                        reason: format!("{}: {}", field, err),
                    });
                    return None;
                }
            }
        }

        Some(outcome.or_instant(self.now))
    }
}

/// Fold rows in input order and return the tree, newest workout first.
pub fn build_workouts(rows: Vec<WorkoutRow>, policy: DatePolicy) -> BuildOutput {
    let mut builder = WorkoutTreeBuilder::new(policy);
    for row in rows {
        builder.push(row);
    }
    builder.build()
}

fn build_set(row: &WorkoutRow) -> WorkoutSet {
    WorkoutSet {
        index: parse_count(&row.set_index),
        kind: clean_text(&row.set_type),
        weight_kg: parse_number(&row.weight_kg),
        reps: parse_count(&row.reps),
        distance_km: parse_number(&row.distance_km),
        duration_seconds: parse_number(&row.duration_seconds),
        rpe: parse_number(&row.rpe),
    }
}

/// Empty text or a lone quote character means "no value".
pub fn clean_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "\"" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Tolerant float parsing: empty or non-numeric yields `None`. Accepts a decimal comma.
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    value
        .parse::<f64>()
        .ok()
        .or_else(|| value.replacen(',', ".", 1).parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Tolerant non-negative integer parsing. `"8.0"` is 8, `"8.5"` is `None`.
pub fn parse_count(value: &str) -> Option<u32> {
    let n = parse_number(value)?;
    if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
        Some(n as u32)
    } else {
        None
    }
}

fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "workout".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(
        line: usize,
        title: &str,
        start: &str,
        exercise: &str,
        weight: &str,
        reps: &str,
    ) -> WorkoutRow {
        WorkoutRow {
            line,
            title: title.into(),
            start_time: start.into(),
            exercise_title: exercise.into(),
            set_index: "1".into(),
            set_type: "normal".into(),
            weight_kg: weight.into(),
            reps: reps.into(),
            ..Default::default()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn build(rows: Vec<WorkoutRow>, policy: DatePolicy) -> BuildOutput {
        let mut builder = WorkoutTreeBuilder::with_clock(policy, fixed_now());
        for r in rows {
            builder.push(r);
        }
        builder.build()
    }

    #[test]
    fn test_rows_merge_by_title_and_start() {
        let out = build(
            vec![
                row(2, "Push", "16 Dec 2025, 15:06", "Bench Press", "100", "5"),
                row(3, "Push", "16 Dec 2025, 15:06", "Dips", "", "12"),
                row(4, "Push", "16 Dec 2025, 15:06", "Bench Press", "105", "3"),
            ],
            DatePolicy::Lenient,
        );

        assert_eq!(out.workouts.len(), 1);
        let workout = &out.workouts[0];
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].title, "Bench Press");
        assert_eq!(workout.exercises[0].sets.len(), 2);
        assert_eq!(workout.exercises[0].sets[1].weight_kg, Some(105.0));
        assert_eq!(workout.estimated_volume_kg, 815.0);
    }

    #[test]
    fn test_dedup_key_is_raw_string() {
        let out = build(
            vec![
                row(2, "Push", "16 Dec 2025, 15:06", "Bench Press", "100", "5"),
                row(3, "Push", "16 Dez 2025, 15:06", "Bench Press", "100", "5"),
            ],
            DatePolicy::Lenient,
        );

        assert_eq!(out.workouts.len(), 2);
        assert_eq!(out.workouts[0].start_time, out.workouts[1].start_time);
        assert_ne!(out.workouts[0].id, out.workouts[1].id);
    }

    #[test]
    fn test_sorted_newest_first() {
        let out = build(
            vec![
                row(2, "A", "2024-01-01 10:00", "Squat", "100", "5"),
                row(3, "B", "2024-03-01 10:00", "Squat", "100", "5"),
                row(4, "C", "2024-02-01 10:00", "Squat", "100", "5"),
            ],
            DatePolicy::Lenient,
        );

        let titles: Vec<_> = out.workouts.iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_volume_skips_missing_values() {
        let out = build(
            vec![
                row(2, "Mixed", "2024-01-01 10:00", "Plank", "", ""),
                row(3, "Mixed", "2024-01-01 10:00", "Row", "abc", "10"),
                row(4, "Mixed", "2024-01-01 10:00", "Row", "50", "10"),
            ],
            DatePolicy::Lenient,
        );

        let workout = &out.workouts[0];
        assert_eq!(workout.estimated_volume_kg, 500.0);
        assert_eq!(workout.exercises[0].sets[0].weight_kg, None);
        assert_eq!(workout.exercises[0].sets[0].reps, None);
        assert_eq!(workout.exercises[1].sets[0].weight_kg, None);
    }

    #[test]
    fn test_description_and_notes_cleaning() {
        let mut first = row(2, "Push", "2024-01-01 10:00", "Bench Press", "100", "5");
        first.description = "\"".into();
        first.exercise_notes = "slow eccentric".into();
        first.superset_id = "".into();
        first.end_time = "2024-01-01 11:00".into();

        let out = build(vec![first], DatePolicy::Lenient);
        let workout = &out.workouts[0];
        assert_eq!(workout.description, None);
        assert_eq!(workout.end_time, Some(workout.start_time + 3600));
        assert_eq!(workout.exercises[0].notes.as_deref(), Some("slow eccentric"));
        assert_eq!(workout.exercises[0].superset_id, None);
    }

    #[test]
    fn test_lenient_dates_fall_back_to_now() {
        let out = build(
            vec![row(2, "Mystery", "not a date", "Squat", "100", "5")],
            DatePolicy::Lenient,
        );

        assert_eq!(out.workouts.len(), 1);
        assert_eq!(out.workouts[0].start_time, fixed_now().timestamp());
        assert_eq!(out.date_fallbacks.len(), 1);
        assert_eq!(out.date_fallbacks[0].line, 2);
        assert_eq!(out.date_fallbacks[0].field, "start_time");
    }

    #[test]
    fn test_strict_dates_skip_rows() {
        let out = build(
            vec![
                row(2, "Mystery", "not a date", "Squat", "100", "5"),
                row(3, "Legs", "2024-01-01 10:00", "Squat", "100", "5"),
            ],
            DatePolicy::Strict,
        );

        assert_eq!(out.workouts.len(), 1);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].line, 2);
        assert!(out.skipped[0].reason.contains("start_time"));
        assert!(out.date_fallbacks.is_empty());
    }

    #[test]
    fn test_set_index_kept_as_declared() {
        let mut a = row(2, "Push", "2024-01-01 10:00", "Bench Press", "100", "5");
        a.set_index = "3".into();
        let mut b = row(3, "Push", "2024-01-01 10:00", "Bench Press", "100", "5");
        b.set_index = "3".into();

        let out = build(vec![a, b], DatePolicy::Lenient);
        let sets = &out.workouts[0].exercises[0].sets;
        assert_eq!(sets[0].index, Some(3));
        assert_eq!(sets[1].index, Some(3));
    }

    #[test]
    fn test_tolerant_numbers() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("82.5"), Some(82.5));
        assert_eq!(parse_number("82,5"), Some(82.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_count("8"), Some(8));
        assert_eq!(parse_count("8.0"), Some(8));
        assert_eq!(parse_count("8.5"), None);
        assert_eq!(parse_count("-1"), None);
    }

    #[test]
    fn test_identical_input_gives_identical_trees() {
        let rows = vec![
            row(2, "Push", "2024-01-01 10:00", "Bench Press", "100", "5"),
            row(3, "Legs", "2024-01-02 10:00", "Squat", "120", "5"),
        ];
        let a = build(rows.clone(), DatePolicy::Lenient);
        let b = build(rows, DatePolicy::Lenient);

        for (x, y) in a.workouts.iter().zip(&b.workouts) {
            assert_eq!(x.title, y.title);
            assert_eq!(x.start_time, y.start_time);
            assert_eq!(x.exercises, y.exercises);
            assert_eq!(x.estimated_volume_kg, y.estimated_volume_kg);
        }
    }
}
