//! Track lookup on the music platform.

use super::error::{error_for_status, ServiceError};
use crate::config::LookupSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Finds the platform id of a track by name and artist.
#[async_trait]
pub trait TrackLookup: Send + Sync {
    /// `Ok(None)` when the platform has no match.
    async fn find_track_id(&self, track_name: &str, artist_name: &str) -> Result<Option<String>, ServiceError>;
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<SearchTracks>,
}

#[derive(Deserialize)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: Option<String>,
}

pub fn search_query(track_name: &str, artist_name: &str) -> String {
    format!("track:{} artist:{}", track_name.trim(), artist_name.trim())
}

/// Takes the first item of a search answer. A response without the `tracks` object is
/// malformed; an empty item list is a plain miss.
pub fn parse_search_response(body: &str) -> Result<Option<String>, ServiceError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::InvalidResponse(format!("search: {}", e)))?;
    let tracks = response
        .tracks
        .ok_or_else(|| ServiceError::InvalidResponse("search: missing tracks".to_string()))?;
    match tracks.items.into_iter().next() {
        None => Ok(None),
        Some(SearchItem { id: Some(id) }) if !id.is_empty() => Ok(Some(id)),
        Some(_) => Err(ServiceError::InvalidResponse(
            "search: first item has no id".to_string(),
        )),
    }
}

/// Spotify Web API search client.
///
/// Takes an already issued bearer token; obtaining it is not this client's job.
pub struct SpotifyLookupClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl SpotifyLookupClient {
    pub fn new(settings: &LookupSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create lookup HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            access_token: settings.access_token.clone(),
        })
    }
}

#[async_trait]
impl TrackLookup for SpotifyLookupClient {
    async fn find_track_id(&self, track_name: &str, artist_name: &str) -> Result<Option<String>, ServiceError> {
        let url = format!("{}/search", self.base_url);
        let query = search_query(track_name, artist_name);
        debug!(query = %query, "Looking up track");

        let mut request = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")]);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_for_status(response, &query).await);
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_format() {
        assert_eq!(
            search_query(" Holocene ", "Bon Iver"),
            "track:Holocene artist:Bon Iver"
        );
    }

    #[test]
    fn test_parse_first_item() {
        let body = r#"{"tracks": {"items": [{"id": "abc", "name": "Holocene"}, {"id": "def"}]}}"#;
        assert_eq!(parse_search_response(body).unwrap(), Some("abc".to_string()));
    }

    #[test]
    fn test_parse_no_match() {
        let body = r#"{"tracks": {"items": []}}"#;
        assert_eq!(parse_search_response(body).unwrap(), None);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_search_response(r#"{"artists": {}}"#),
            Err(ServiceError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_search_response(r#"{"tracks": {"items": [{"name": "x"}]}}"#),
            Err(ServiceError::InvalidResponse(_))
        ));
        assert!(parse_search_response("not json").is_err());
    }
}
