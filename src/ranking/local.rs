use super::distance::score_row;
use super::top_k::select_top_k;
use super::RankedTrack;
use crate::catalog::CatalogStore;
use crate::features::{FeatureVector, FeatureWeights, FEATURE_COUNT};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Ranks the whole static catalog against a target.
pub struct LocalSimilarityEngine {
    catalog: Arc<CatalogStore>,
}

impl LocalSimilarityEngine {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// Scores every row in one batched pass and returns the `k` closest, ascending.
    ///
    /// Ties keep row order. An empty catalog yields an empty list.
    pub fn rank(&self, target: &FeatureVector, weights: &FeatureWeights, k: usize) -> Vec<RankedTrack> {
        let scores: Vec<f32> = self
            .catalog
            .feature_matrix()
            .par_chunks_exact(FEATURE_COUNT)
            .map(|row| score_row(row, target, weights))
            .collect();

        debug!("Scored {} catalog rows", scores.len());

        select_top_k(&scores, k)
            .into_iter()
            .filter_map(|scored| {
                let metadata = self.catalog.metadata_at(scored.index)?;
                Some(RankedTrack {
                    track_id: metadata.id.clone(),
                    score: scored.score,
                    metadata: Some(metadata.clone()),
                })
            })
            .collect()
    }
}
