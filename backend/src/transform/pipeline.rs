//! High-level ingestion API: raw export → workout collection.
//!
//! ```rust,ignore
//! use ironlog::{ingest_file, IngestOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = ingest_file("workouts.csv".as_ref(), IngestOptions::default()).await?;
//!     println!("{} workouts", report.workouts.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::builder::{build_workouts, DateFallback, DatePolicy};
use crate::api::logs::{log_info, log_success, log_warning, log_warning_indent, LogStage};
use crate::error::IngestError;
use crate::models::Workout;
use crate::parser::{decode_content, detect_delimiter, detect_encoding, parse_table, SkippedRow};

/// How many individual row problems are echoed to the log.
const LOGGED_ROW_ISSUES: usize = 5;

/// Options for ingesting an export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOptions {
    /// Field separator; auto-detected from the header line when absent.
    #[serde(default)]
    pub delimiter: Option<char>,

    #[serde(default)]
    pub date_policy: DatePolicy,

    /// Reject headers carrying columns this tool does not know.
    #[serde(default)]
    pub strict_columns: bool,
}

/// Input file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    /// Data records seen, including skipped ones.
    pub row_count: usize,
}

/// Everything an ingest produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Newest first.
    pub workouts: Vec<Workout>,
    pub csv_info: CsvInfo,
    pub skipped_rows: Vec<SkippedRow>,
    pub ignored_columns: Vec<String>,
    pub date_fallbacks: Vec<DateFallback>,
}

/// Ingest an export file.
pub async fn ingest_file(path: &Path, options: IngestOptions) -> Result<IngestReport, IngestError> {
    log_info(LogStage::Parse, format!("Reading {}", path.display()));
    let bytes = tokio::fs::read(path).await?;
    ingest_bytes(&bytes, options)
}

/// Ingest raw bytes of unknown encoding.
pub fn ingest_bytes(bytes: &[u8], options: IngestOptions) -> Result<IngestReport, IngestError> {
    let encoding = detect_encoding(bytes);
    let text = decode_content(bytes, &encoding)?;
    ingest_decoded(&text, encoding, options)
}

/// Ingest already-decoded text.
pub fn ingest_text(text: &str, options: IngestOptions) -> Result<IngestReport, IngestError> {
    ingest_decoded(text, "utf-8".to_string(), options)
}

fn ingest_decoded(
    text: &str,
    encoding: String,
    options: IngestOptions,
) -> Result<IngestReport, IngestError> {
    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(text));
    log_info(
        LogStage::Parse,
        format!("Encoding {}, delimiter '{}'", encoding, format_delimiter(delimiter)),
    );

    let table = parse_table(text, delimiter, options.strict_columns)?;
    let row_count = table.rows.len() + table.skipped.len();

    log_success(LogStage::Parse, format!("Header valid, {} data rows", row_count));
    if !table.ignored_columns.is_empty() {
        log_warning(
            LogStage::Parse,
            format!("Ignoring unknown columns: {}", table.ignored_columns.join(", ")),
        );
    }

    let built = build_workouts(table.rows, options.date_policy);

    let mut skipped_rows = table.skipped;
    skipped_rows.extend(built.skipped);
    skipped_rows.sort_by_key(|s| s.line);

    report_issues(&skipped_rows, &built.date_fallbacks);
    log_success(
        LogStage::Build,
        format!(
            "{} workouts, {} sets",
            built.workouts.len(),
            built.workouts.iter().map(Workout::set_count).sum::<usize>()
        ),
    );

    Ok(IngestReport {
        workouts: built.workouts,
        csv_info: CsvInfo {
            encoding,
            delimiter,
            headers: table.headers,
            row_count,
        },
        skipped_rows,
        ignored_columns: table.ignored_columns,
        date_fallbacks: built.date_fallbacks,
    })
}

fn report_issues(skipped: &[SkippedRow], fallbacks: &[DateFallback]) {
    if !skipped.is_empty() {
        log_warning(LogStage::Parse, format!("{} rows skipped", skipped.len()));
        for row in skipped.iter().take(LOGGED_ROW_ISSUES) {
            log_warning_indent(LogStage::Parse, row.reason.clone(), 1);
        }
    }

    if !fallbacks.is_empty() {
        log_warning(
            LogStage::Build,
            format!("{} timestamps could not be parsed and were set to now", fallbacks.len()),
        );
        for fb in fallbacks.iter().take(LOGGED_ROW_ISSUES) {
            log_warning_indent(
                LogStage::Build,
                format!("Line {}, {} '{}': {}", fb.line, fb.field, fb.value, fb.reason),
                1,
            );
        }
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use std::io::Write;

    const SEMICOLON_EXPORT: &str = "\
title;start_time;end_time;description;exercise_title;superset_id;exercise_notes;set_index;set_type;weight_kg;reps;distance_km;duration_seconds;rpe
Push;16 Dez 2025, 15:06;16 Dez 2025, 16:10;\"Heavy; felt good\";Bench Press (Barbell);;;0;normal;100;10;;;8
Push;16 Dez 2025, 15:06;16 Dez 2025, 16:10;\"Heavy; felt good\";Bench Press (Barbell);;;1;normal;110;5;;;9
Push;16 Dez 2025, 15:06;16 Dez 2025, 16:10;\"Heavy; felt good\";Pull Up;;;0;normal;;12;;;
Legs;18 Dez 2025, 09:00;;;Romanian Deadlift (Barbell);;;0;normal;120;8;;;
broken;row
";

    #[test]
    fn test_ingest_text_end_to_end() {
        let report = ingest_text(SEMICOLON_EXPORT, IngestOptions::default()).unwrap();

        assert_eq!(report.csv_info.delimiter, ';');
        assert_eq!(report.csv_info.row_count, 5);
        assert_eq!(report.workouts.len(), 2);
        assert_eq!(report.skipped_rows.len(), 1);
        assert_eq!(report.skipped_rows[0].line, 6);

        let legs = &report.workouts[0];
        assert_eq!(legs.title, "Legs");
        assert_eq!(legs.end_time, None);

        let push = &report.workouts[1];
        assert_eq!(push.description.as_deref(), Some("Heavy; felt good"));
        assert_eq!(push.exercises.len(), 2);
        assert_eq!(push.estimated_volume_kg, 1550.0);
        assert_eq!(push.end_time, Some(push.start_time + 64 * 60));
        assert!(report.date_fallbacks.is_empty());
    }

    #[test]
    fn test_explicit_delimiter_overrides_detection() {
        let options = IngestOptions {
            delimiter: Some(','),
            ..Default::default()
        };
        let err = ingest_text(SEMICOLON_EXPORT, options).unwrap_err();
        assert!(matches!(err, IngestError::Format(FormatError::MissingHeader)));
    }

    #[test]
    fn test_pounds_export_rejected() {
        let text = SEMICOLON_EXPORT.replacen("weight_kg", "weight_lbs", 1);
        let err = ingest_text(&text, IngestOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedUnit { .. }));
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let err = ingest_bytes(b"", IngestOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::Format(FormatError::EmptyInput)));
    }

    #[test]
    fn test_windows_1252_bytes() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(SEMICOLON_EXPORT.lines().next().unwrap().as_bytes());
        bytes.extend_from_slice(b"\r\nGes\xe4\xdf;3 M\xe4r 2024, 08:30;;;Squat;;;0;normal;100;5;;;\r\n");

        let text = decode_content(&bytes, "windows-1252").unwrap();
        let report = ingest_text(&text, IngestOptions::default()).unwrap();
        assert_eq!(report.workouts.len(), 1);
        assert_eq!(report.workouts[0].title, "Gesäß");
        assert!(report.date_fallbacks.is_empty());
    }

    #[test]
    fn test_ingest_bytes_utf8_german_month() {
        let header = SEMICOLON_EXPORT.lines().next().unwrap();
        let text = format!(
            "{}\nPush;3 Mär 2024, 08:30;;5'10\" tall;Squat;;;0;normal;100;5;;;\nPull;4 Mär 2024, 08:30;;;Row;;;0;normal;80;8;;;\n",
            header
        );

        let report = ingest_bytes(text.as_bytes(), IngestOptions::default()).unwrap();
        assert_eq!(report.csv_info.encoding, "utf-8");
        assert!(report.date_fallbacks.is_empty());
        assert!(report.skipped_rows.is_empty());
        assert_eq!(report.workouts.len(), 2);

        let push = &report.workouts[1];
        assert_eq!(push.title, "Push");
        assert_eq!(push.start_time, 1_709_454_600);
        assert_eq!(push.description.as_deref(), Some("5'10\" tall"));
    }

    #[tokio::test]
    async fn test_ingest_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEMICOLON_EXPORT.as_bytes()).unwrap();

        let report = ingest_file(file.path(), IngestOptions::default()).await.unwrap();
        assert_eq!(report.workouts.len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_missing_file() {
        let err = ingest_file(Path::new("/definitely/not/here.csv"), IngestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
