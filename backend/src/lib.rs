//! # Ironlog - Workout export ingestion and training analytics
//!
//! Ironlog reads workout-tracker CSV exports (one row per performed set),
//! rebuilds the workout → exercise → set tree, and computes training
//! statistics: volume, muscle distribution, personal records and top exercises.
//! Workouts can also be pulled from the Hevy public API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV export │────▶│   Parser    │────▶│   Builder   │────▶│  Analytics  │
//! │  (any enc.) │     │ (auto-delim)│     │ (tree+dates)│     │ (stats/PRs) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                     ┌─────────────┐            │
//!                     │  Hevy API   │────────────┘
//!                     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ironlog::{compute_statistics, ingest_file, AnalyticsOptions, IngestOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = ingest_file("workouts.csv".as_ref(), IngestOptions::default()).await?;
//!     let stats = compute_statistics(&report.workouts, &AnalyticsOptions::default());
//!     println!("{} kg lifted", stats.total_volume);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Workout, exercise, set and raw row models
//! - [`parser`] - Encoding, delimiter and header handling, record tokenizing
//! - [`transform`] - Date normalization, tree building and the ingest pipeline
//! - [`analytics`] - Volume, muscle groups and personal records
//! - [`source`] - Live workout sources (Hevy API)
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Analytics
pub mod analytics;

// Live sources
pub mod source;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    DateParseError, FormatError, IngestError, RowShapeError, ServerError, SourceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{sort_newest_first, Exercise, Workout, WorkoutRow, WorkoutSet};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_line, parse_table, split_records,
    Column, HeaderLayout, ParsedTable, SkippedRow,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    build_workouts, normalize_date, translate_month, BuildOutput, DateFallback, DateOutcome,
    DatePolicy, WorkoutTreeBuilder,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    ingest_bytes, ingest_file, ingest_text, CsvInfo, IngestOptions, IngestReport,
};

// =============================================================================
// Re-exports - Analytics
// =============================================================================

pub use analytics::{
    average_volume, classify_exercise, compute_statistics, estimated_one_rep_max,
    muscle_distribution, personal_bests, personal_record_events, prs_over_time, top_exercises,
    total_reps, total_sets, total_volume, AnalyticsOptions, ExerciseVolume, MuscleGroup,
    PersonalBest, PrEvent, PrKind, PrPeriod, PrPoint, WorkoutStatistics,
};

// =============================================================================
// Re-exports - Sources
// =============================================================================

pub use source::{fetch_all, HevyClient, WorkoutPage, WorkoutSource};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ResponseMetadata, UploadQuery, UploadResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
