//! Seed resolution: turning the interpreter's (track, artist) guesses into platform ids.

use crate::external::TrackLookup;
use crate::retry_policy::RetryPolicy;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// A track the interpreter suggested as a seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReference {
    pub track_name: String,
    pub artist_name: String,
}

impl SeedReference {
    pub fn new(track_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: artist_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSeed {
    pub reference: SeedReference,
    pub track_id: String,
}

pub struct SeedResolver {
    lookup: Arc<dyn TrackLookup>,
    retry: RetryPolicy,
    max_seeds: usize,
}

impl SeedResolver {
    pub fn new(lookup: Arc<dyn TrackLookup>, retry: RetryPolicy, max_seeds: usize) -> Self {
        Self {
            lookup,
            retry,
            max_seeds,
        }
    }

    /// Resolves up to `max_seeds` references, keeping input order.
    ///
    /// References that can not be resolved are dropped and logged. This never fails as a
    /// whole; an empty result is for the caller to judge.
    pub async fn resolve(&self, references: &[SeedReference]) -> Vec<ResolvedSeed> {
        if references.len() > self.max_seeds {
            debug!(
                "Ignoring {} seed references over the cap of {}",
                references.len() - self.max_seeds,
                self.max_seeds
            );
        }
        let capped = &references[..references.len().min(self.max_seeds)];

        let lookups = capped.iter().map(|reference| self.resolve_one(reference));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn resolve_one(&self, reference: &SeedReference) -> Option<ResolvedSeed> {
        if reference.track_name.trim().is_empty() || reference.artist_name.trim().is_empty() {
            warn!("Dropping seed with empty name: {:?}", reference);
            return None;
        }

        let lookup = &self.lookup;
        let result = self
            .retry
            .run("track lookup", move || {
                lookup.find_track_id(&reference.track_name, &reference.artist_name)
            })
            .await;

        match result {
            Ok(Some(track_id)) => {
                debug!(
                    "Resolved seed '{}' by '{}' to {}",
                    reference.track_name, reference.artist_name, track_id
                );
                Some(ResolvedSeed {
                    reference: reference.clone(),
                    track_id,
                })
            }
            Ok(None) => {
                warn!(
                    "No match for seed '{}' by '{}'",
                    reference.track_name, reference.artist_name
                );
                None
            }
            Err(err) => {
                warn!(
                    "Could not resolve seed '{}' by '{}': {}",
                    reference.track_name, reference.artist_name, err
                );
                None
            }
        }
    }
}
