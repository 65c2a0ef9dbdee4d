//! Recommendation service client.
//!
//! The service answers with a list of recommended tracks, each pointing back to the music
//! platform through an `href`, and exposes the audio features of every track separately.

use super::error::{error_for_status, ServiceError};
use crate::config::RecommenderSettings;
use crate::features::{Feature, PartialFeatures, FEATURE_COUNT, FEATURE_ORDER};
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

static TRACK_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/track/([^/?#]+)").expect("track href pattern"));

/// What to ask the recommendation service for.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    /// Platform track ids of the resolved seeds.
    pub seed_ids: Vec<String>,
    /// Raw target values as the interpreter produced them (tempo in BPM, popularity 0..100).
    pub targets: [Option<f32>; FEATURE_COUNT],
    pub size: usize,
}

impl RecommendationRequest {
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.seed_ids.is_empty() {
            params.push(("seeds".to_string(), self.seed_ids.join(",")));
        }
        for feature in FEATURE_ORDER {
            if let Some(value) = self.targets[feature.index()] {
                params.push((feature.name().to_string(), value.to_string()));
            }
        }
        params.push(("size".to_string(), self.size.to_string()));
        params
    }
}

/// A track proposed by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedTrack {
    /// Platform track id, taken from the `href`.
    pub track_id: String,
    /// The service's own id, used to fetch audio features.
    pub service_id: String,
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<RecommendedTrack>, ServiceError>;

    async fn audio_features(&self, track: &RecommendedTrack) -> Result<PartialFeatures, ServiceError>;
}

#[derive(Deserialize)]
struct RecommendationResponse {
    #[serde(default)]
    content: Vec<RecommendationItem>,
}

#[derive(Deserialize)]
struct RecommendationItem {
    id: Option<String>,
    href: Option<String>,
}

#[derive(Deserialize)]
struct AudioFeaturesResponse {
    acousticness: Option<f32>,
    danceability: Option<f32>,
    energy: Option<f32>,
    tempo: Option<f32>,
    valence: Option<f32>,
    popularity: Option<f32>,
}

pub fn extract_track_id(href: &str) -> Option<&str> {
    TRACK_HREF
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Items without a usable `href` or id are skipped.
pub fn parse_recommendations(body: &str) -> Result<Vec<RecommendedTrack>, ServiceError> {
    let response: RecommendationResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::InvalidResponse(format!("recommendations: {}", e)))?;

    Ok(response
        .content
        .into_iter()
        .filter_map(|item| {
            let track_id = extract_track_id(item.href.as_deref()?)?.to_string();
            Some(RecommendedTrack {
                track_id,
                service_id: item.id?,
            })
        })
        .collect())
}

pub fn parse_audio_features(body: &str) -> Result<PartialFeatures, ServiceError> {
    let r: AudioFeaturesResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::InvalidResponse(format!("audio features: {}", e)))?;
    let mut raw = [None; FEATURE_COUNT];
    for feature in FEATURE_ORDER {
        raw[feature.index()] = match feature {
            Feature::Acousticness => r.acousticness,
            Feature::Danceability => r.danceability,
            Feature::Energy => r.energy,
            Feature::Tempo => r.tempo,
            Feature::Valence => r.valence,
            Feature::Popularity => r.popularity,
        };
    }
    Ok(PartialFeatures::from_raw(raw))
}

/// HTTP client for the ReccoBeats recommendation API.
pub struct ReccoBeatsClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReccoBeatsClient {
    pub fn new(settings: &RecommenderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create recommendation HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RecommendationService for ReccoBeatsClient {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<RecommendedTrack>, ServiceError> {
        let url = format!("{}/track/recommendation", self.base_url);
        debug!(
            seeds = request.seed_ids.len(),
            size = request.size,
            "Requesting recommendations"
        );

        let response = self
            .client
            .get(&url)
            .query(&request.query_params())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response, "recommendations").await);
        }

        let body = response.text().await?;
        parse_recommendations(&body)
    }

    async fn audio_features(&self, track: &RecommendedTrack) -> Result<PartialFeatures, ServiceError> {
        let url = format!(
            "{}/track/{}/audio-features",
            self.base_url,
            urlencoding::encode(&track.service_id)
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(error_for_status(response, &track.service_id).await);
        }

        let body = response.text().await?;
        parse_audio_features(&body)
    }
}
