//! Similarity ranking shared by both pipelines.
//!
//! Both the local catalog engine and the external candidate re-ranker score with
//! [`distance::weighted_squared_distance`] and select with [`top_k::select_top_k`].

pub mod distance;
mod external;
mod local;
pub mod top_k;

pub use external::{rank_candidates, Candidate};
pub use local::LocalSimilarityEngine;

use crate::catalog::TrackMetadata;
use serde::Serialize;

/// One entry of a ranked result list. Lower score is closer to the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTrack {
    pub track_id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TrackMetadata>,
}
