//! Domain models shared by the CSV pipeline, the live API source and analytics.
//!
//! - [`Workout`] - One training session with its exercises
//! - [`Exercise`] - One movement inside a workout, with its sets
//! - [`WorkoutSet`] - A single set as recorded by the tracking app
//! - [`WorkoutRow`] - One validated CSV data row, before folding into the tree

use serde::{Deserialize, Serialize};

// =============================================================================
// Workout
// =============================================================================

/// A training session.
///
/// Built once by the tree builder or the live source and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// Synthetic identifier, not stable across parses.
    pub id: String,
    pub title: String,
    /// Start time in epoch seconds (UTC).
    pub start_time: i64,
    /// End time in epoch seconds (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub exercises: Vec<Exercise>,
    /// Running sum of `weight_kg * reps` over sets that carry both.
    pub estimated_volume_kg: f64,
}

impl Workout {
    /// Create an empty workout.
    pub fn new(id: String, title: String, start_time: i64) -> Self {
        Self {
            id,
            title,
            start_time,
            end_time: None,
            description: None,
            exercises: Vec::new(),
            estimated_volume_kg: 0.0,
        }
    }

    /// Find the exercise with exactly this title, creating it at the end if absent.
    pub fn exercise_mut(&mut self, title: &str) -> &mut Exercise {
        let idx = match self.exercises.iter().position(|e| e.title == title) {
            Some(idx) => idx,
            None => {
                self.exercises.push(Exercise::new(title.to_string()));
                self.exercises.len() - 1
            }
        };
        &mut self.exercises[idx]
    }

    /// Number of sets across all exercises.
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Iterate every set together with its exercise.
    pub fn sets(&self) -> impl Iterator<Item = (&Exercise, &WorkoutSet)> {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter().map(move |s| (e, s)))
    }
}

/// Order a workout collection newest first. Ties keep their input order.
pub fn sort_newest_first(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
}

// =============================================================================
// Exercise
// =============================================================================

/// A movement performed during a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Sets in input order.
    pub sets: Vec<WorkoutSet>,
}

impl Exercise {
    pub fn new(title: String) -> Self {
        Self {
            title,
            superset_id: None,
            notes: None,
            sets: Vec::new(),
        }
    }
}

// =============================================================================
// Set
// =============================================================================

/// A single set.
///
/// `index` is whatever the source declared; it may be sparse or repeated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub index: Option<u32>,
    /// Free-form label such as "normal", "warmup" or "dropset".
    pub kind: Option<String>,
    pub weight_kg: Option<f64>,
    pub reps: Option<u32>,
    pub distance_km: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub rpe: Option<f64>,
}

impl WorkoutSet {
    /// `weight_kg * reps` when both are present.
    pub fn volume(&self) -> Option<f64> {
        match (self.weight_kg, self.reps) {
            (Some(w), Some(r)) => Some(w * f64::from(r)),
            _ => None,
        }
    }
}

// =============================================================================
// CSV Row
// =============================================================================

/// One data row mapped against a validated header.
///
/// Values are the trimmed raw strings; numeric parsing happens in the builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkoutRow {
    /// 1-based line number of the record in the input.
    pub line: usize,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub exercise_title: String,
    pub superset_id: String,
    pub exercise_notes: String,
    pub set_index: String,
    pub set_type: String,
    pub weight_kg: String,
    pub reps: String,
    pub distance_km: String,
    pub duration_seconds: String,
    pub rpe: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(weight: Option<f64>, reps: Option<u32>) -> WorkoutSet {
        WorkoutSet {
            weight_kg: weight,
            reps,
            ..Default::default()
        }
    }

    #[test]
    fn test_set_volume_requires_both_fields() {
        assert_eq!(set(Some(100.0), Some(5)).volume(), Some(500.0));
        assert_eq!(set(None, Some(5)).volume(), None);
        assert_eq!(set(Some(100.0), None).volume(), None);
    }

    #[test]
    fn test_exercise_mut_merges_identical_titles() {
        let mut workout = Workout::new("w".into(), "Push".into(), 0);
        workout.exercise_mut("Bench Press").sets.push(set(Some(60.0), Some(8)));
        workout.exercise_mut("Squat").sets.push(set(Some(80.0), Some(5)));
        workout.exercise_mut("Bench Press").sets.push(set(Some(65.0), Some(6)));

        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].title, "Bench Press");
        assert_eq!(workout.exercises[0].sets.len(), 2);
        assert_eq!(workout.set_count(), 3);
    }

    #[test]
    fn test_exercise_titles_are_case_sensitive() {
        let mut workout = Workout::new("w".into(), "Push".into(), 0);
        workout.exercise_mut("bench press");
        workout.exercise_mut("Bench Press");
        assert_eq!(workout.exercises.len(), 2);
    }

    #[test]
    fn test_sort_newest_first_is_stable() {
        let mut workouts = vec![
            Workout::new("a".into(), "A".into(), 10),
            Workout::new("b".into(), "B".into(), 30),
            Workout::new("c".into(), "C".into(), 10),
        ];
        sort_newest_first(&mut workouts);
        let ids: Vec<_> = workouts.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_workout_serializes_camel_case_without_nulls() {
        let workout = Workout::new("w1".into(), "Legs".into(), 1_700_000_000);
        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(json["startTime"], 1_700_000_000);
        assert!(json.get("endTime").is_none());
        assert!(json.get("estimatedVolumeKg").is_some());
    }
}
