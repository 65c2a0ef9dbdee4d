use super::distance::weighted_squared_distance;
use super::top_k::select_top_k;
use super::RankedTrack;
use crate::features::{FeatureVector, FeatureWeights, PartialFeatures};
use std::collections::HashSet;
use tracing::debug;

/// A track proposed by the recommendation service, with whatever features it reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub track_id: String,
    pub features: PartialFeatures,
}

/// Whether `features` holds at least one dimension that `weights` cares about.
///
/// With all-zero weights every candidate qualifies.
fn reports_weighted_dimension(features: &PartialFeatures, weights: &FeatureWeights) -> bool {
    weights.is_all_zero()
        || features
            .values()
            .iter()
            .zip(weights.as_array())
            .any(|(value, weight)| value.is_some() && *weight > 0.0)
}

/// Re-ranks external candidates against the target.
///
/// A dimension a candidate does not report is left out of that candidate's score, as if its
/// weight were 0. A candidate reporting none of the weighted dimensions can not be scored and
/// is dropped. Repeated ids are kept once, first occurrence wins. The result follows the same
/// ordering rules as the local engine.
pub fn rank_candidates(
    candidates: &[Candidate],
    target: &FeatureVector,
    weights: &FeatureWeights,
    k: usize,
) -> Vec<RankedTrack> {
    let mut seen = HashSet::new();
    let unique: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| seen.insert(c.track_id.as_str()))
        .collect();

    if unique.len() != candidates.len() {
        debug!(
            "Dropped {} duplicated candidates",
            candidates.len() - unique.len()
        );
    }

    let deduplicated = unique.len();
    let unique: Vec<&Candidate> = unique
        .into_iter()
        .filter(|c| reports_weighted_dimension(&c.features, weights))
        .collect();
    if unique.len() != deduplicated {
        debug!(
            "Dropped {} candidates without any weighted feature",
            deduplicated - unique.len()
        );
    }

    let scores: Vec<f32> = unique
        .iter()
        .map(|c| weighted_squared_distance(c.features.values().iter().copied(), target, weights))
        .collect();

    select_top_k(&scores, k)
        .into_iter()
        .map(|scored| RankedTrack {
            track_id: unique[scored.index].track_id.clone(),
            score: scored.score,
            metadata: None,
        })
        .collect()
}
