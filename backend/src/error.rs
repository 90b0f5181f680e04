//! Error types for the ironlog ingestion pipeline.
//!
//! - [`FormatError`] - Input is empty or has no header row
//! - [`IngestError`] - Structural errors that abort a whole parse
//! - [`RowShapeError`] - A data row whose field count does not match the header
//! - [`DateParseError`] - A timestamp that could not be normalized
//! - [`SourceError`] - Live workout API errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Only [`FormatError`] and [`IngestError`] reject an operation. Row and date
//! errors are recorded on the ingest result and the parse continues.

use thiserror::Error;

// =============================================================================
// Format Errors
// =============================================================================

/// The input text is not a delimited table at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Nothing but whitespace was supplied.
    #[error("Input is empty")]
    EmptyInput,

    /// The first record does not name any known workout column.
    #[error("No header row found (first line does not name any workout column)")]
    MissingHeader,
}

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors that abort a CSV ingest before any row is folded.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Empty input or missing header.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Weights are recorded in a unit other than kilograms.
    #[error("Unsupported weight unit: column '{column}' found, only weight_kg is accepted")]
    UnsupportedUnit { column: String },

    /// A required column is absent from the header.
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// An unknown column is present and strict column checking is enabled.
    #[error("Unrecognized column: {column}")]
    UnrecognizedColumn { column: String },

    /// Raw bytes could not be decoded to text.
    #[error("Failed to decode input: {0}")]
    Encoding(String),

    /// Failed to read the input file.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Row-level Errors (recovered)
// =============================================================================

/// A data row whose field count differs from the header's.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Line {line}: expected {expected} fields, found {found}")]
pub struct RowShapeError {
    pub line: usize,
    pub expected: usize,
    pub found: usize,
}

/// A timestamp that matched none of the accepted shapes.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cannot parse date '{input}': {reason}")]
pub struct DateParseError {
    pub input: String,
    pub reason: String,
}

impl DateParseError {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Live Source Errors
// =============================================================================

/// Errors from the live workout API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No API key configured.
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Ingest rejected the upload.
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Live source failure.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for live source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_converts_to_ingest_error() {
        let err: IngestError = FormatError::EmptyInput.into();
        assert!(matches!(err, IngestError::Format(FormatError::EmptyInput)));
        assert_eq!(err.to_string(), "Input is empty");
    }

    #[test]
    fn test_unsupported_unit_message_names_column() {
        let err = IngestError::UnsupportedUnit {
            column: "weight_lbs".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("weight_lbs"));
        assert!(msg.contains("weight_kg"));
    }

    #[test]
    fn test_row_shape_error_format() {
        let err = RowShapeError {
            line: 7,
            expected: 14,
            found: 12,
        };
        assert_eq!(err.to_string(), "Line 7: expected 14 fields, found 12");
    }

    #[test]
    fn test_ingest_error_into_server_error() {
        let err: ServerError = IngestError::MissingColumn {
            column: "weight_kg".into(),
        }
        .into();
        assert!(err.to_string().contains("weight_kg"));
    }
}
