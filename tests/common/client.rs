//! HTTP client for integration tests
//!
//! Wraps reqwest with one method per server endpoint. When routes or request formats change,
//! update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// POST /v1/compare
    pub async fn compare(&self, prompt: &str) -> Response {
        self.client
            .post(format!("{}/v1/compare", self.base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .expect("Compare request failed")
    }

    /// POST /v1/compare/{id}/vote
    pub async fn vote(&self, comparison_id: &str, choice: &str) -> Response {
        self.client
            .post(format!("{}/v1/compare/{}/vote", self.base_url, comparison_id))
            .json(&json!({ "choice": choice }))
            .send()
            .await
            .expect("Vote request failed")
    }

    /// GET /v1/catalog/row/{index}
    pub async fn catalog_row(&self, index: usize) -> Response {
        self.client
            .get(format!("{}/v1/catalog/row/{}", self.base_url, index))
            .send()
            .await
            .expect("Catalog row request failed")
    }
}
