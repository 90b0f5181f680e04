//! Header validation and positional row mapping.
//!
//! The header is checked once, up front. Every later record is mapped by
//! position into a [`WorkoutRow`], so no lookup by column name happens per row.

use crate::error::{FormatError, IngestError, RowShapeError};
use crate::models::WorkoutRow;

/// A column the workout export must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    StartTime,
    EndTime,
    Description,
    ExerciseTitle,
    SupersetId,
    ExerciseNotes,
    SetIndex,
    SetType,
    WeightKg,
    Reps,
    DistanceKm,
    DurationSeconds,
    Rpe,
}

impl Column {
    /// All required columns, in export order.
    pub const ALL: [Column; 14] = [
        Column::Title,
        Column::StartTime,
        Column::EndTime,
        Column::Description,
        Column::ExerciseTitle,
        Column::SupersetId,
        Column::ExerciseNotes,
        Column::SetIndex,
        Column::SetType,
        Column::WeightKg,
        Column::Reps,
        Column::DistanceKm,
        Column::DurationSeconds,
        Column::Rpe,
    ];

    /// Header name as written in the export.
    pub fn name(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::StartTime => "start_time",
            Column::EndTime => "end_time",
            Column::Description => "description",
            Column::ExerciseTitle => "exercise_title",
            Column::SupersetId => "superset_id",
            Column::ExerciseNotes => "exercise_notes",
            Column::SetIndex => "set_index",
            Column::SetType => "set_type",
            Column::WeightKg => "weight_kg",
            Column::Reps => "reps",
            Column::DistanceKm => "distance_km",
            Column::DurationSeconds => "duration_seconds",
            Column::Rpe => "rpe",
        }
    }

    /// Match a header cell, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase();
        Column::ALL.into_iter().find(|c| c.name() == normalized)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// True for weight columns denominated in pounds (`weight_lbs`, `weight_lb`, ...).
fn is_pound_column(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    name.starts_with("weight") && (name.contains("lb") || name.contains("pound"))
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    positions: [usize; 14],
    width: usize,
    /// Header cells that name no known column (or repeat one).
    pub ignored: Vec<String>,
}

impl HeaderLayout {
    /// Validate a tokenized header.
    ///
    /// Check order: pound-denominated weight, any known column at all,
    /// `weight_kg`, then the remaining required columns.
    pub fn from_headers(headers: &[String], strict_columns: bool) -> Result<Self, IngestError> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(FormatError::MissingHeader.into());
        }

        if let Some(col) = headers.iter().find(|h| is_pound_column(h)) {
            return Err(IngestError::UnsupportedUnit {
                column: col.trim().to_string(),
            });
        }

        let mut found: [Option<usize>; 14] = [None; 14];
        let mut ignored = Vec::new();

        for (pos, header) in headers.iter().enumerate() {
            match Column::from_name(header) {
                Some(col) if found[col.slot()].is_none() => found[col.slot()] = Some(pos),
                _ => ignored.push(header.trim().to_string()),
            }
        }

        if found.iter().all(Option::is_none) {
            return Err(FormatError::MissingHeader.into());
        }

        if found[Column::WeightKg.slot()].is_none() {
            return Err(IngestError::MissingColumn {
                column: Column::WeightKg.name().to_string(),
            });
        }

        let mut positions = [0usize; 14];
        for col in Column::ALL {
            positions[col.slot()] = found[col.slot()].ok_or_else(|| IngestError::MissingColumn {
                column: col.name().to_string(),
            })?;
        }

        if strict_columns {
            if let Some(column) = ignored.first() {
                return Err(IngestError::UnrecognizedColumn {
                    column: column.clone(),
                });
            }
        }

        Ok(Self {
            positions,
            width: headers.len(),
            ignored,
        })
    }

    /// Number of fields every data row must have.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map a tokenized record onto the header.
    pub fn map_row(
        &self,
        line: usize,
        mut fields: Vec<String>,
    ) -> Result<WorkoutRow, RowShapeError> {
        if fields.len() != self.width() {
            return Err(RowShapeError {
                line,
                expected: self.width(),
                found: fields.len(),
            });
        }

        let mut take = |col: Column| std::mem::take(&mut fields[self.positions[col.slot()]]);

        Ok(WorkoutRow {
            line,
            title: take(Column::Title),
            start_time: take(Column::StartTime),
            end_time: take(Column::EndTime),
            description: take(Column::Description),
            exercise_title: take(Column::ExerciseTitle),
            superset_id: take(Column::SupersetId),
            exercise_notes: take(Column::ExerciseNotes),
            set_index: take(Column::SetIndex),
            set_type: take(Column::SetType),
            weight_kg: take(Column::WeightKg),
            reps: take(Column::Reps),
            distance_km: take(Column::DistanceKm),
            duration_seconds: take(Column::DurationSeconds),
            rpe: take(Column::Rpe),
        })
    }
}
