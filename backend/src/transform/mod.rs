//! Row-to-tree transformation.
//!
//! - Dates: locale-aware timestamp normalization
//! - Builder: flat rows to the Workout → Exercise → Set tree
//! - Pipeline: bytes/text/file entry points tying parser and builder together

pub mod builder;
pub mod dates;
pub mod pipeline;

pub use builder::{build_workouts, BuildOutput, DateFallback, DatePolicy, WorkoutTreeBuilder};
pub use dates::{normalize_date, translate_month, DateOutcome};
pub use pipeline::*;
