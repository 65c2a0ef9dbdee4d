use axum::extract::FromRef;

use crate::catalog::CatalogStore;
use crate::harness::ComparisonHarness;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalogStore = Arc<CatalogStore>;
pub type GuardedHarness = Arc<ComparisonHarness>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: GuardedCatalogStore,
    pub harness: GuardedHarness,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog: GuardedCatalogStore,
        harness: GuardedHarness,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog,
            harness,
            hash: env!("PROMPTIFY_BUILD_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogStore {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedHarness {
    fn from_ref(input: &ServerState) -> Self {
        input.harness.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
