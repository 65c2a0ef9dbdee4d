use super::{PipelineError, PipelineKind, PipelineStage, RunContext};
use crate::catalog::CatalogStore;
use crate::external::{RecommendationRequest, RecommendationService, ServiceError};
use crate::interpretation::{InterpretationMode, InterpretedQuery};
use crate::ranking::{rank_candidates, Candidate, LocalSimilarityEngine, RankedTrack};
use crate::retry_policy::RetryPolicy;
use crate::seeds::SeedResolver;
use async_trait::async_trait;
use clap::ValueEnum;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the external pipeline does when none of the seeds resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ZeroSeedPolicy {
    /// Fail the run with `SeedUnresolvable`.
    #[default]
    Fail,
    /// Ask the recommendation service with feature targets only.
    FeaturesOnly,
}

/// Where a pipeline gets its ranked tracks from, once the prompt is interpreted.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    fn kind(&self) -> PipelineKind;

    fn interpretation_mode(&self) -> InterpretationMode;

    /// Produces at most `k` tracks, recording the stages it goes through.
    async fn produce(
        &self,
        query: &InterpretedQuery,
        k: usize,
        context: &mut RunContext,
    ) -> Result<Vec<RankedTrack>, PipelineError>;
}

pub struct LocalCatalogSource {
    engine: LocalSimilarityEngine,
}

impl LocalCatalogSource {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self {
            engine: LocalSimilarityEngine::new(catalog),
        }
    }
}

#[async_trait]
impl CandidateSource for LocalCatalogSource {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Local
    }

    fn interpretation_mode(&self) -> InterpretationMode {
        InterpretationMode::FeaturesOnly
    }

    async fn produce(
        &self,
        query: &InterpretedQuery,
        k: usize,
        context: &mut RunContext,
    ) -> Result<Vec<RankedTrack>, PipelineError> {
        context.enter(PipelineStage::Ranking);
        if self.engine.catalog().is_empty() {
            return Err(PipelineError::EmptyCandidateSet);
        }
        Ok(self.engine.rank(&query.target, &query.weights, k))
    }
}

pub struct ExternalServiceSource {
    resolver: SeedResolver,
    service: Arc<dyn RecommendationService>,
    retry: RetryPolicy,
    pool_size: usize,
    zero_seed_policy: ZeroSeedPolicy,
}

impl ExternalServiceSource {
    pub fn new(
        resolver: SeedResolver,
        service: Arc<dyn RecommendationService>,
        retry: RetryPolicy,
        pool_size: usize,
        zero_seed_policy: ZeroSeedPolicy,
    ) -> Self {
        Self {
            resolver,
            service,
            retry,
            pool_size,
            zero_seed_policy,
        }
    }

    async fn fetch_candidates(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Candidate>, PipelineError> {
        let service = &self.service;
        let tracks = self
            .retry
            .run("recommendation", move || service.recommend(request))
            .await?;
        if tracks.is_empty() {
            return Err(PipelineError::EmptyCandidateSet);
        }
        debug!("Recommendation service proposed {} tracks", tracks.len());

        let lookups = tracks.iter().map(|track| {
            self.retry
                .run("audio features", move || service.audio_features(track))
        });
        let features = join_all(lookups).await;

        let mut last_error: Option<ServiceError> = None;
        let mut candidates = Vec::with_capacity(tracks.len());
        for (track, result) in tracks.iter().zip(features) {
            match result {
                Ok(features) => candidates.push(Candidate {
                    track_id: track.track_id.clone(),
                    features,
                }),
                Err(err) => {
                    warn!("Dropping candidate {}: {}", track.track_id, err);
                    last_error = Some(err);
                }
            }
        }

        match (candidates.is_empty(), last_error) {
            (true, Some(err)) => Err(PipelineError::ExternalService(err)),
            (true, None) => Err(PipelineError::EmptyCandidateSet),
            (false, _) => Ok(candidates),
        }
    }
}

#[async_trait]
impl CandidateSource for ExternalServiceSource {
    fn kind(&self) -> PipelineKind {
        PipelineKind::External
    }

    fn interpretation_mode(&self) -> InterpretationMode {
        InterpretationMode::WithSeeds
    }

    async fn produce(
        &self,
        query: &InterpretedQuery,
        k: usize,
        context: &mut RunContext,
    ) -> Result<Vec<RankedTrack>, PipelineError> {
        context.enter(PipelineStage::ResolvingSeeds);
        let seeds = self.resolver.resolve(&query.seeds).await;
        let mut seen = HashSet::new();
        let seed_ids: Vec<String> = seeds
            .iter()
            .filter(|s| seen.insert(s.track_id.as_str()))
            .map(|s| s.track_id.clone())
            .collect();
        info!(
            "Resolved {} of {} seed tracks",
            seeds.len(),
            query.seeds.len()
        );
        context.record_seeds(seeds);

        if seed_ids.is_empty() {
            match self.zero_seed_policy {
                ZeroSeedPolicy::Fail => {
                    return Err(PipelineError::SeedUnresolvable {
                        attempted: query.seeds.len(),
                    })
                }
                ZeroSeedPolicy::FeaturesOnly => {
                    warn!("No seeds resolved, asking for recommendations by features only")
                }
            }
        }

        context.enter(PipelineStage::RetrievingCandidates);
        let request = RecommendationRequest {
            seed_ids,
            targets: query.raw_targets,
            size: self.pool_size,
        };
        let candidates = self.fetch_candidates(&request).await?;

        context.enter(PipelineStage::Ranking);
        let ranked = rank_candidates(&candidates, &query.target, &query.weights, k);
        if ranked.is_empty() {
            return Err(PipelineError::EmptyCandidateSet);
        }
        Ok(ranked)
    }
}
