//! REST API types for dashboard clients.
//!
//! Workouts and statistics are returned in the same camelCase shape the CLI
//! prints, so a dashboard can consume either.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::analytics::{compute_statistics, AnalyticsOptions, WorkoutStatistics};
use crate::models::Workout;
use crate::parser::SkippedRow;
use crate::transform::{CsvInfo, DateFallback, IngestReport};

/// Response sent after a CSV upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready" when every row made it in, "warning" otherwise
    pub status: String,

    /// Newest first
    pub workouts: Vec<Workout>,

    pub statistics: WorkoutStatistics,

    pub metadata: ResponseMetadata,
}

/// What the ingest noticed along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total_workouts: usize,
    pub csv_info: CsvInfo,
    pub skipped_rows: Vec<SkippedRow>,
    pub ignored_columns: Vec<String>,
    pub date_fallbacks: Vec<DateFallback>,
}

/// Query parameters accepted by `POST /api/upload`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    /// `workout`, `week` or `month`
    #[serde(default)]
    pub period: Option<crate::analytics::PrPeriod>,

    /// Skip rows with unparseable timestamps instead of substituting now.
    #[serde(default)]
    pub strict_dates: bool,

    #[serde(default)]
    pub strict_columns: bool,

    #[serde(default)]
    pub top: Option<usize>,
}

impl UploadQuery {
    pub fn analytics_options(&self) -> AnalyticsOptions {
        let defaults = AnalyticsOptions::default();
        AnalyticsOptions {
            top_n: self.top.unwrap_or(defaults.top_n),
            pr_period: self.period.unwrap_or(defaults.pr_period),
        }
    }
}

impl UploadResponse {
    /// Build a response from an ingest report, computing statistics on the way.
    pub fn from_report(report: IngestReport, options: &AnalyticsOptions) -> Self {
        let statistics = compute_statistics(&report.workouts, options);
        let clean = report.skipped_rows.is_empty() && report.date_fallbacks.is_empty();

        UploadResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if clean { "ready" } else { "warning" }.to_string(),
            metadata: ResponseMetadata {
                total_workouts: report.workouts.len(),
                csv_info: report.csv_info,
                skipped_rows: report.skipped_rows,
                ignored_columns: report.ignored_columns,
                date_fallbacks: report.date_fallbacks,
            },
            workouts: report.workouts,
            statistics,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "workouts": [],
        "metadata": {
            "totalWorkouts": 0
        }
    })
}
