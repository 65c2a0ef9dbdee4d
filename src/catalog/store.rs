//! In-memory, read-only catalog.

use super::integrity::{check_alignment, check_values, CatalogError};
use super::models::TrackMetadata;
use crate::features::{FeatureVector, FEATURE_COUNT};
use serde::Serialize;

/// Static catalog held in two row-aligned containers.
///
/// `rows[i]` and `matrix[i * FEATURE_COUNT..(i + 1) * FEATURE_COUNT]` always describe the same
/// record. The store is built once and never mutated, so it can be shared behind an `Arc`
/// without any locking.
#[derive(Debug)]
pub struct CatalogStore {
    rows: Vec<TrackMetadata>,
    matrix: Vec<f32>,
}

/// Borrowed view of one catalog row.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogRow<'a> {
    pub row_index: usize,
    pub metadata: &'a TrackMetadata,
    pub features: FeatureVector,
}

impl CatalogStore {
    /// Builds a store, validating shape and values.
    pub fn from_parts(rows: Vec<TrackMetadata>, matrix: Vec<f32>) -> Result<Self, CatalogError> {
        check_alignment(&rows, &matrix)?;
        check_values(&matrix)?;
        Ok(Self { rows, matrix })
    }

    /// Builds a store checking only the row alignment.
    ///
    /// Used by the loader when the per-value range checks are disabled.
    pub fn from_parts_unchecked_values(
        rows: Vec<TrackMetadata>,
        matrix: Vec<f32>,
    ) -> Result<Self, CatalogError> {
        check_alignment(&rows, &matrix)?;
        Ok(Self { rows, matrix })
    }

    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            matrix: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major feature matrix, `row_count() * FEATURE_COUNT` values.
    pub fn feature_matrix(&self) -> &[f32] {
        &self.matrix
    }

    pub fn metadata_at(&self, row: usize) -> Option<&TrackMetadata> {
        self.rows.get(row)
    }

    pub fn features_at(&self, row: usize) -> Option<FeatureVector> {
        let start = row.checked_mul(FEATURE_COUNT)?;
        let values = self.matrix.get(start..start + FEATURE_COUNT)?;
        let mut array = [0.0; FEATURE_COUNT];
        array.copy_from_slice(values);
        Some(FeatureVector::from_normalized(array))
    }

    pub fn row(&self, row: usize) -> Option<CatalogRow<'_>> {
        Some(CatalogRow {
            row_index: row,
            metadata: self.metadata_at(row)?,
            features: self.features_at(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IntegrityProblem;
    use crate::features::Feature;

    fn track(id: &str) -> TrackMetadata {
        TrackMetadata {
            id: id.to_string(),
            name: format!("Song {}", id),
            artists: "Someone".to_string(),
            album: "Something".to_string(),
            genre: "ambient".to_string(),
        }
    }

    #[test]
    fn test_rows_stay_aligned() {
        let rows = vec![track("a"), track("b"), track("c")];
        let mut matrix = Vec::new();
        for i in 0..3 {
            matrix.extend_from_slice(&[i as f32 / 10.0; FEATURE_COUNT]);
        }
        let store = CatalogStore::from_parts(rows, matrix).unwrap();

        assert_eq!(store.row_count(), 3);
        for i in 0..3 {
            let row = store.row(i).unwrap();
            assert_eq!(row.metadata.id, ["a", "b", "c"][i]);
            assert_eq!(row.features.get(Feature::Energy), i as f32 / 10.0);
        }
        assert!(store.row(3).is_none());
    }

    #[test]
    fn test_from_parts_rejects_misaligned_input() {
        let err = CatalogStore::from_parts(vec![track("a")], vec![0.1; FEATURE_COUNT + 1]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IntegrityViolation(IntegrityProblem::MatrixShape { rows: 1, .. })
        ));
    }

    #[test]
    fn test_from_parts_rejects_unnormalized_values() {
        let err = CatalogStore::from_parts(vec![track("a")], vec![120.0; FEATURE_COUNT]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IntegrityViolation(IntegrityProblem::ValueOutOfRange { row: 0, .. })
        ));
        assert!(CatalogStore::from_parts_unchecked_values(vec![track("a")], vec![120.0; FEATURE_COUNT]).is_ok());
    }

    #[test]
    fn test_empty_store() {
        let store = CatalogStore::empty();
        assert!(store.is_empty());
        assert!(store.feature_matrix().is_empty());
        assert!(store.features_at(0).is_none());
    }
}
