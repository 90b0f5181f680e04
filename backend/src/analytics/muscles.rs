//! Muscle-group classification by exercise title.
//!
//! Titles are lower-cased, hyphens become spaces, then the pattern table is
//! scanned in order. The first pattern contained in the title wins and every
//! group it lists gets one count per set. Titles matching nothing are not counted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::saturating_count;
use crate::models::Workout;

/// The fixed muscle-group vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Legs,
    Core,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 7] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Biceps,
        MuscleGroup::Triceps,
        MuscleGroup::Legs,
        MuscleGroup::Core,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Core => "core",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct MusclePattern {
    /// Lower-case substring looked for in the normalized title.
    pub pattern: &'static str,
    pub groups: &'static [MuscleGroup],
}

const fn rule(pattern: &'static str, groups: &'static [MuscleGroup]) -> MusclePattern {
    MusclePattern { pattern, groups }
}

use MuscleGroup::{Back, Biceps, Chest, Core, Legs, Shoulders, Triceps};

/// Default table. Order matters: specific patterns sit above the generic
/// ones they contain ("leg curl" before "curl", "upright row" before "row").
pub const MUSCLE_PATTERNS: &[MusclePattern] = &[
    // chest
    rule("close grip bench", &[Triceps, Chest]),
    rule("bench press", &[Chest]),
    rule("chest press", &[Chest]),
    rule("chest fly", &[Chest]),
    rule("pec deck", &[Chest]),
    rule("cable crossover", &[Chest]),
    rule("push up", &[Chest, Triceps]),
    rule("dip", &[Chest, Triceps]),
    // back
    rule("deadlift", &[Back, Legs]),
    rule("pull up", &[Back, Biceps]),
    rule("chin up", &[Back, Biceps]),
    rule("lat pulldown", &[Back, Biceps]),
    rule("pulldown", &[Back]),
    rule("upright row", &[Shoulders]),
    rule("row", &[Back]),
    rule("back extension", &[Back]),
    rule("shrug", &[Back]),
    // shoulders
    rule("overhead press", &[Shoulders, Triceps]),
    rule("shoulder press", &[Shoulders, Triceps]),
    rule("military press", &[Shoulders, Triceps]),
    rule("arnold press", &[Shoulders]),
    rule("lateral raise", &[Shoulders]),
    rule("front raise", &[Shoulders]),
    rule("reverse fly", &[Shoulders]),
    rule("rear delt", &[Shoulders]),
    rule("face pull", &[Shoulders, Back]),
    rule("fly", &[Chest]),
    // arms
    rule("leg curl", &[Legs]),
    rule("hamstring curl", &[Legs]),
    rule("wrist curl", &[Biceps]),
    rule("curl", &[Biceps]),
    rule("tricep", &[Triceps]),
    rule("skull crusher", &[Triceps]),
    rule("pushdown", &[Triceps]),
    rule("kickback", &[Triceps]),
    // legs
    rule("squat", &[Legs]),
    rule("lunge", &[Legs]),
    rule("leg press", &[Legs]),
    rule("leg extension", &[Legs]),
    rule("calf raise", &[Legs]),
    rule("hip thrust", &[Legs]),
    rule("glute bridge", &[Legs]),
    rule("step up", &[Legs]),
    // core
    rule("leg raise", &[Core]),
    rule("crunch", &[Core]),
    rule("plank", &[Core]),
    rule("sit up", &[Core]),
    rule("ab wheel", &[Core]),
    rule("russian twist", &[Core]),
    rule("hollow", &[Core]),
];

/// Groups for an exercise title using the default table.
pub fn classify_exercise(title: &str) -> &'static [MuscleGroup] {
    classify_with(title, MUSCLE_PATTERNS)
}

/// Groups for an exercise title using a caller-supplied table.
pub fn classify_with(title: &str, patterns: &[MusclePattern]) -> &'static [MuscleGroup] {
    let normalized = title.to_lowercase().replace('-', " ");
    patterns
        .iter()
        .find(|p| normalized.contains(p.pattern))
        .map(|p| p.groups)
        .unwrap_or(&[])
}

/// Set counts per muscle group over the default table. All seven groups are present.
pub fn muscle_distribution(workouts: &[Workout]) -> BTreeMap<MuscleGroup, u32> {
    muscle_distribution_with(workouts, MUSCLE_PATTERNS)
}

pub fn muscle_distribution_with(
    workouts: &[Workout],
    patterns: &[MusclePattern],
) -> BTreeMap<MuscleGroup, u32> {
    let mut distribution: BTreeMap<MuscleGroup, u32> =
        MuscleGroup::ALL.iter().map(|g| (*g, 0)).collect();

    for exercise in workouts.iter().flat_map(|w| &w.exercises) {
        let sets = saturating_count(exercise.sets.len());
        for group in classify_with(&exercise.title, patterns) {
            if let Some(count) = distribution.get_mut(group) {
                *count = count.saturating_add(sets);
            }
        }
    }

    distribution
}
