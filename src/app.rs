//! Wires the configured collaborators into a comparison harness.

use crate::catalog::CatalogStore;
use crate::config::AppConfig;
use crate::external::{ReccoBeatsClient, RecommendationService, SpotifyLookupClient, TrackLookup};
use crate::harness::ComparisonHarness;
use crate::interpretation::llm::{LlmProvider, OpenAIProvider};
use crate::interpretation::{LlmPromptInterpreter, PromptInterpreter};
use crate::pipeline::{ExternalServiceSource, LocalCatalogSource, Orchestrator};
use crate::retry_policy::RetryPolicy;
use crate::seeds::SeedResolver;
use crate::votes::{JsonLinesVoteSink, TracingVoteSink, VoteSink};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// The outside world the pipelines talk to.
pub struct Collaborators {
    pub interpreter: Arc<dyn PromptInterpreter>,
    pub lookup: Arc<dyn TrackLookup>,
    pub recommender: Arc<dyn RecommendationService>,
    pub vote_sink: Arc<dyn VoteSink>,
}

impl Collaborators {
    /// Real HTTP clients as configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAIProvider::from_settings(&config.llm));
        info!(
            "Interpreting prompts with {} model {}",
            provider.name(),
            provider.model()
        );

        let vote_sink: Arc<dyn VoteSink> = match &config.votes.path {
            Some(path) => {
                info!("Appending votes to {:?}", path);
                Arc::new(JsonLinesVoteSink::new(path.clone()))
            }
            None => Arc::new(TracingVoteSink),
        };

        Ok(Self {
            interpreter: Arc::new(LlmPromptInterpreter::new(
                provider,
                &config.llm,
                config.ranking.max_seeds,
            )),
            lookup: Arc::new(SpotifyLookupClient::new(&config.lookup)?),
            recommender: Arc::new(ReccoBeatsClient::new(&config.recommender)?),
            vote_sink,
        })
    }
}

pub fn build_harness(
    config: &AppConfig,
    catalog: Arc<CatalogStore>,
    collaborators: Collaborators,
) -> ComparisonHarness {
    let retry = RetryPolicy::new(&config.retry);
    let ranking = &config.ranking;

    let external_source = ExternalServiceSource::new(
        SeedResolver::new(collaborators.lookup, retry.clone(), ranking.max_seeds),
        collaborators.recommender,
        retry,
        ranking.candidate_pool_size,
        ranking.zero_seed_policy,
    );
    let external = Orchestrator::new(
        collaborators.interpreter.clone(),
        Arc::new(external_source),
        ranking.playlist_length,
    );
    let local = Orchestrator::new(
        collaborators.interpreter,
        Arc::new(LocalCatalogSource::new(catalog)),
        ranking.playlist_length,
    );

    ComparisonHarness::new(
        external,
        local,
        collaborators.vote_sink,
        config.votes.max_pending_comparisons,
    )
}
