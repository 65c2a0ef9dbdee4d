//! A fully wired application on top of the fixture catalog and the in-memory fakes.
//!
//! Tests keep handles on every fake so they can inspect what the pipelines did.

use super::fakes::*;
use super::fixtures::create_test_catalog;
use promptify::app::{build_harness, Collaborators};
use promptify::catalog::{load_catalog, CatalogStore};
use promptify::config::{AppConfig, CliConfig};
use promptify::harness::ComparisonHarness;
use promptify::seeds::SeedReference;
use std::sync::Arc;
use tempfile::TempDir;

/// Raw targets of the default interpretation: acoustic, calm, slow, not too popular.
pub const DEFAULT_RAW_TARGETS: [f32; 6] = [0.9, 0.1, 0.1, 75.0, 0.3, 20.0];

/// Only acousticness counts in the default interpretation.
pub const ACOUSTIC_ONLY_WEIGHTS: [f32; 6] = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];

pub fn default_seeds() -> Vec<SeedReference> {
    vec![
        SeedReference::new("First Seed", "Someone"),
        SeedReference::new("Second Seed", "Someone Else"),
    ]
}

pub struct TestWorld {
    pub interpreter: Arc<FixedInterpreter>,
    pub lookup: Arc<MapLookup>,
    pub recommender: Arc<FakeRecommender>,
    pub vote_sink: Arc<MemoryVoteSink>,
    pub config: AppConfig,
    pub catalog: Arc<CatalogStore>,

    _temp_catalog_dir: TempDir,
}

impl TestWorld {
    /// Fixture catalog, default interpretation, every fake cooperating.
    pub fn new() -> Self {
        Self::with(
            FixedInterpreter::new(query_with_seeds(
                DEFAULT_RAW_TARGETS,
                ACOUSTIC_ONLY_WEIGHTS,
                default_seeds(),
            )),
            MapLookup::with_default_seeds(),
            FakeRecommender::with_default_candidates(),
            MemoryVoteSink::default(),
        )
    }

    /// # Panics
    ///
    /// Panics if the fixture catalog can not be created or loaded.
    pub fn with(
        interpreter: FixedInterpreter,
        lookup: MapLookup,
        recommender: FakeRecommender,
        vote_sink: MemoryVoteSink,
    ) -> Self {
        let (temp_catalog_dir, catalog_path) =
            create_test_catalog().expect("Failed to create test catalog");

        let cli = CliConfig {
            catalog_path: Some(catalog_path),
            ..Default::default()
        };
        let mut config =
            AppConfig::resolve_with_env(&cli, None, |_| None).expect("Failed to resolve config");
        config.retry.initial_backoff_ms = 1;
        config.retry.max_backoff_ms = 1;

        let catalog =
            load_catalog(&config.catalog_path, true).expect("Failed to load test catalog");

        Self {
            interpreter: Arc::new(interpreter),
            lookup: Arc::new(lookup),
            recommender: Arc::new(recommender),
            vote_sink: Arc::new(vote_sink),
            config,
            catalog,
            _temp_catalog_dir: temp_catalog_dir,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            interpreter: self.interpreter.clone(),
            lookup: self.lookup.clone(),
            recommender: self.recommender.clone(),
            vote_sink: self.vote_sink.clone(),
        }
    }

    pub fn harness(&self) -> ComparisonHarness {
        build_harness(&self.config, self.catalog.clone(), self.collaborators())
    }
}
