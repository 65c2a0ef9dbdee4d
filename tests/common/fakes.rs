//! In-memory stand-ins for the outside world: the LLM interpreter, the music platform lookup,
//! the recommendation service and the vote store.

use super::constants::*;
use async_trait::async_trait;
use promptify::external::{
    RecommendationRequest, RecommendationService, RecommendedTrack, ServiceError, TrackLookup,
};
use promptify::features::{FeatureWeights, PartialFeatures, FEATURE_COUNT};
use promptify::interpretation::{
    InterpretationError, InterpretationMode, InterpretedQuery, PromptInterpreter,
};
use promptify::seeds::SeedReference;
use promptify::votes::{VoteRecord, VoteSink, VoteSinkError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Builds a query from raw targets, with the given seeds attached.
pub fn query_with_seeds(
    raw_targets: [f32; FEATURE_COUNT],
    weights: [f32; FEATURE_COUNT],
    seeds: Vec<SeedReference>,
) -> InterpretedQuery {
    let mut query = InterpretedQuery::from_targets(raw_targets, FeatureWeights::new(weights));
    query.seeds = seeds;
    query
}

/// Answers every prompt with the same interpretation.
pub struct FixedInterpreter {
    answer: Result<InterpretedQuery, InterpretationError>,
    calls: AtomicUsize,
}

impl FixedInterpreter {
    pub fn new(query: InterpretedQuery) -> Self {
        Self {
            answer: Ok(query),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: InterpretationError) -> Self {
        Self {
            answer: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptInterpreter for FixedInterpreter {
    async fn interpret(
        &self,
        prompt: &str,
        _mode: InterpretationMode,
    ) -> Result<InterpretedQuery, InterpretationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.trim().is_empty() {
            return Err(InterpretationError::EmptyPrompt);
        }
        self.answer.clone()
    }
}

/// Resolves only the track names it was told about.
pub struct MapLookup {
    known: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MapLookup {
    pub fn new(known: &[(&str, &str)]) -> Self {
        Self {
            known: known
                .iter()
                .map(|(name, id)| (name.to_string(), id.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Knows "First Seed", "Second Seed" and "Third Seed".
    pub fn with_default_seeds() -> Self {
        Self::new(&[
            ("First Seed", SEED_1_ID),
            ("Second Seed", SEED_2_ID),
            ("Third Seed", SEED_3_ID),
        ])
    }

    /// Resolves nothing.
    pub fn empty() -> Self {
        Self::new(&[])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackLookup for MapLookup {
    async fn find_track_id(
        &self,
        track_name: &str,
        _artist_name: &str,
    ) -> Result<Option<String>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.known.get(track_name).cloned())
    }
}

/// Proposes a fixed candidate list and remembers the last request.
pub struct FakeRecommender {
    candidates: Vec<(RecommendedTrack, Result<PartialFeatures, ServiceError>)>,
    last_request: Mutex<Option<RecommendationRequest>>,
}

impl FakeRecommender {
    pub fn new(candidates: Vec<(&str, Result<PartialFeatures, ServiceError>)>) -> Self {
        Self {
            candidates: candidates
                .into_iter()
                .map(|(id, features)| {
                    (
                        RecommendedTrack {
                            track_id: id.to_string(),
                            service_id: format!("service-{}", id),
                        },
                        features,
                    )
                })
                .collect(),
            last_request: Mutex::new(None),
        }
    }

    /// Three candidates with complete features.
    pub fn with_default_candidates() -> Self {
        Self::new(vec![
            (
                RECOMMENDED_1_ID,
                Ok(complete([0.9, 0.3, 0.2, 80.0, 0.3, 40.0])),
            ),
            (
                RECOMMENDED_2_ID,
                Ok(complete([0.2, 0.8, 0.9, 125.0, 0.6, 80.0])),
            ),
            (
                RECOMMENDED_3_ID,
                Ok(complete([0.6, 0.5, 0.5, 100.0, 0.5, 60.0])),
            ),
        ])
    }

    pub fn last_request(&self) -> Option<RecommendationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

/// Raw audio features with every dimension present.
pub fn complete(raw: [f32; FEATURE_COUNT]) -> PartialFeatures {
    PartialFeatures::from_raw(raw.map(Some))
}

#[async_trait]
impl RecommendationService for FakeRecommender {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendedTrack>, ServiceError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.candidates.iter().map(|(track, _)| track.clone()).collect())
    }

    async fn audio_features(&self, track: &RecommendedTrack) -> Result<PartialFeatures, ServiceError> {
        self.candidates
            .iter()
            .find(|(candidate, _)| candidate.track_id == track.track_id)
            .map(|(_, features)| features.clone())
            .unwrap_or_else(|| Err(ServiceError::NotFound(track.track_id.clone())))
    }
}

/// Keeps votes in memory, or refuses them all.
#[derive(Default)]
pub struct MemoryVoteSink {
    votes: Mutex<Vec<VoteRecord>>,
    broken: bool,
}

impl MemoryVoteSink {
    pub fn broken() -> Self {
        Self {
            votes: Mutex::new(Vec::new()),
            broken: true,
        }
    }

    pub fn votes(&self) -> Vec<VoteRecord> {
        self.votes.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoteSink for MemoryVoteSink {
    async fn record(&self, vote: &VoteRecord) -> Result<(), VoteSinkError> {
        if self.broken {
            return Err(VoteSinkError::Io {
                path: "memory".into(),
                message: "disk full".to_string(),
            });
        }
        self.votes.lock().unwrap().push(vote.clone());
        Ok(())
    }
}
