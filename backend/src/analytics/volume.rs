//! Volume and count aggregates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::saturating_count;
use crate::models::Workout;

/// Default length of the top-exercise ranking.
pub const DEFAULT_TOP_EXERCISES: usize = 10;

/// One ranked exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseVolume {
    pub name: String,
    /// Rounded to the nearest kilogram.
    pub volume: f64,
    pub sets: u32,
}

/// Sum of `weight_kg * reps` over every set carrying both, rounded once at the end.
pub fn total_volume(workouts: &[Workout]) -> f64 {
    workouts
        .iter()
        .flat_map(|w| w.sets())
        .filter_map(|(_, set)| set.volume())
        .sum::<f64>()
        .round()
}

/// Rounded total volume divided by the workout count; 0 for no workouts.
pub fn average_volume(workouts: &[Workout]) -> f64 {
    if workouts.is_empty() {
        return 0.0;
    }
    (total_volume(workouts) / workouts.len() as f64).round()
}

pub fn total_sets(workouts: &[Workout]) -> u32 {
    let sets: usize = workouts.iter().map(Workout::set_count).sum();
    saturating_count(sets)
}

pub fn total_reps(workouts: &[Workout]) -> u64 {
    workouts
        .iter()
        .flat_map(|w| w.sets())
        .filter_map(|(_, set)| set.reps)
        .map(u64::from)
        .sum()
}

/// Exercises ranked by total volume, highest first, cut to `limit`.
///
/// Exercises with equal volume keep the order they were first seen in.
pub fn top_exercises(workouts: &[Workout], limit: usize) -> Vec<ExerciseVolume> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranking: Vec<(String, f64, u32)> = Vec::new();

    for exercise in workouts.iter().flat_map(|w| &w.exercises) {
        let slot = *index.entry(exercise.title.as_str()).or_insert_with(|| {
            ranking.push((exercise.title.clone(), 0.0, 0));
            ranking.len() - 1
        });

        let entry = &mut ranking[slot];
        entry.1 += exercise.sets.iter().filter_map(|s| s.volume()).sum::<f64>();
        let sets = saturating_count(exercise.sets.len());
        entry.2 = entry.2.saturating_add(sets);
    }

    ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    ranking
        .into_iter()
        .take(limit)
        .map(|(name, volume, sets)| ExerciseVolume {
            name,
            volume: volume.round(),
            sets,
        })
        .collect()
}
