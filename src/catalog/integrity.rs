//! Integrity checks for the static catalog.
//!
//! The store keeps metadata and features in two parallel containers, so every check here is
//! about the two of them describing the same rows.

use super::models::TrackMetadata;
use crate::features::{FEATURE_COUNT, FEATURE_ORDER};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityProblem {
    MatrixShape {
        rows: usize,
        values: usize,
    },
    ValueOutOfRange {
        row: usize,
        feature: &'static str,
        value: f32,
    },
    EmptyTrackId {
        row: usize,
    },
    RowIndexGap {
        expected: usize,
        found: i64,
    },
    ColumnMismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },
    ColumnCount {
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for IntegrityProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityProblem::MatrixShape { rows, values } => write!(
                f,
                "feature matrix holds {} values but {} rows need {}",
                values,
                rows,
                rows * FEATURE_COUNT
            ),
            IntegrityProblem::ValueOutOfRange { row, feature, value } => {
                write!(f, "row {} has {} = {} outside [0, 1]", row, feature, value)
            }
            IntegrityProblem::EmptyTrackId { row } => write!(f, "row {} has an empty track id", row),
            IntegrityProblem::RowIndexGap { expected, found } => {
                write!(f, "expected row_index {}, found {}", expected, found)
            }
            IntegrityProblem::ColumnMismatch {
                position,
                expected,
                found,
            } => write!(
                f,
                "column {} should be '{}', found '{}'",
                position, expected, found
            ),
            IntegrityProblem::ColumnCount { expected, found } => {
                write!(f, "expected {} columns, found {}", expected, found)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog integrity violation: {0}")]
    IntegrityViolation(IntegrityProblem),
}

impl From<IntegrityProblem> for CatalogError {
    fn from(problem: IntegrityProblem) -> Self {
        CatalogError::IntegrityViolation(problem)
    }
}

/// Checks that the matrix has exactly one feature row per metadata row.
pub fn check_alignment(rows: &[TrackMetadata], matrix: &[f32]) -> Result<(), IntegrityProblem> {
    if matrix.len() != rows.len() * FEATURE_COUNT {
        return Err(IntegrityProblem::MatrixShape {
            rows: rows.len(),
            values: matrix.len(),
        });
    }
    if let Some(row) = rows.iter().position(|r| r.id.trim().is_empty()) {
        return Err(IntegrityProblem::EmptyTrackId { row });
    }
    Ok(())
}

/// Checks that every feature value is finite and normalized.
pub fn check_values(matrix: &[f32]) -> Result<(), IntegrityProblem> {
    for (row, values) in matrix.chunks_exact(FEATURE_COUNT).enumerate() {
        for (feature, value) in FEATURE_ORDER.iter().zip(values) {
            if !value.is_finite() || !(0.0..=1.0).contains(value) {
                return Err(IntegrityProblem::ValueOutOfRange {
                    row,
                    feature: feature.name(),
                    value: *value,
                });
            }
        }
    }
    Ok(())
}
