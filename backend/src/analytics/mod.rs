//! Training analytics over a finished workout collection.
//!
//! Every function here is pure: it reads the collection, never mutates it,
//! and never fails. An empty collection yields zero-valued results.
//!
//! - [`volume`] - Totals, averages and the top-exercise ranking
//! - [`muscles`] - Set distribution over the seven muscle groups
//! - [`records`] - Personal-record detection and timelines

pub mod muscles;
pub mod records;
pub mod volume;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Workout;

pub use muscles::{
    classify_exercise, muscle_distribution, MuscleGroup, MusclePattern, MUSCLE_PATTERNS,
};
pub use records::{
    estimated_one_rep_max, personal_bests, personal_record_events, prs_over_time, PersonalBest,
    PrEvent, PrKind, PrPeriod, PrPoint, PrTracker,
};
pub use volume::{
    average_volume, top_exercises, total_reps, total_sets, total_volume, ExerciseVolume,
    DEFAULT_TOP_EXERCISES,
};

/// Options for [`compute_statistics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOptions {
    /// Length of the top-exercise ranking.
    pub top_n: usize,
    /// Bucket size of `prsOverTime`.
    pub pr_period: PrPeriod,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_EXERCISES,
            pr_period: PrPeriod::Workout,
        }
    }
}

/// The statistics record handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStatistics {
    pub total_volume: f64,
    pub avg_volume_per_workout: f64,
    pub total_workouts: u32,
    pub total_sets: u32,
    pub total_reps: u64,
    pub muscle_distribution: BTreeMap<MuscleGroup, u32>,
    pub prs_over_time: Vec<PrPoint>,
    pub top_exercises: Vec<ExerciseVolume>,
}

/// Clamp a collection size into a `u32` counter.
pub(crate) fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Compute every statistic in one call.
pub fn compute_statistics(workouts: &[Workout], options: &AnalyticsOptions) -> WorkoutStatistics {
    WorkoutStatistics {
        total_volume: total_volume(workouts),
        avg_volume_per_workout: average_volume(workouts),
        total_workouts: saturating_count(workouts.len()),
        total_sets: total_sets(workouts),
        total_reps: total_reps(workouts),
        muscle_distribution: muscle_distribution(workouts),
        prs_over_time: prs_over_time(workouts, options.pr_period),
        top_exercises: top_exercises(workouts, options.top_n),
    }
}
