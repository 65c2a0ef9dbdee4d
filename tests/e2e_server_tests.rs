//! End-to-end tests for the HTTP server
//!
//! A real server on a random port, driven through reqwest.

mod common;

use common::*;
use promptify::harness::LabelAssignment;
use reqwest::StatusCode;
use serde_json::Value;

const PROMPT: &str = "quiet acoustic songs for a rainy afternoon";

async fn create_comparison(client: &TestClient) -> Value {
    let response = client.compare(PROMPT).await;
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_home_reports_stats() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.home().await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["catalog_rows"], 3);
    assert_eq!(body["pending_comparisons"], 0);
    assert!(body["uptime"].as_str().unwrap().starts_with("0d "));
}

#[tokio::test]
async fn test_catalog_row() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.catalog_row(2).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["row_index"], 2);
    assert_eq!(body["metadata"]["id"], TRACK_3_ID);
    assert_eq!(body["metadata"]["name"], TRACK_3_NAME);

    let response = client.catalog_row(3).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comparison_is_blind() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body = create_comparison(&client).await;

    assert_eq!(body["prompt"], PROMPT);
    assert_eq!(body["outcome"]["status"], "complete");
    assert_eq!(body["first"]["label"], "first");
    assert_eq!(body["second"]["label"], "second");

    let text = body.to_string();
    assert!(!text.contains("external"));
    assert!(!text.contains("local"));
    assert!(!text.contains("score"));

    let first: Vec<&str> = body["first"]["track_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let second: Vec<&str> = body["second"]["track_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let local = vec![TRACK_1_ID, TRACK_3_ID, TRACK_2_ID];
    let external = vec![RECOMMENDED_1_ID, RECOMMENDED_3_ID, RECOMMENDED_2_ID];
    assert!(
        (first == local && second == external) || (first == external && second == local),
        "unexpected options {:?} / {:?}",
        first,
        second
    );
}

#[tokio::test]
async fn test_blank_prompt_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.compare("   ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.world.interpreter.calls(), 0);
}

#[tokio::test]
async fn test_vote_flow() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let body = create_comparison(&client).await;
    let id = body["id"].as_str().unwrap();

    let response = client.vote(id, "second").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let accepted: Value = response.json().await.unwrap();
    assert_eq!(accepted["comparison_id"], id);
    assert_eq!(accepted["choice"], "second_option");

    let response = client.vote(id, "first_option").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let votes = server.world.vote_sink.votes();
    assert_eq!(votes.len(), 1);
    let assignment: LabelAssignment = votes[0].assignment;
    assert_eq!(votes[0].unblind(), Some(assignment.second));
}

#[tokio::test]
async fn test_vote_on_unknown_comparison() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .vote("00000000-0000-4000-8000-000000000000", "tie")
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_on_degraded_comparison_is_refused() {
    let world = TestWorld::with(
        FixedInterpreter::new(query_with_seeds(
            DEFAULT_RAW_TARGETS,
            ACOUSTIC_ONLY_WEIGHTS,
            default_seeds(),
        )),
        MapLookup::empty(),
        FakeRecommender::with_default_candidates(),
        MemoryVoteSink::default(),
    );
    let server = TestServer::spawn_with(world).await;
    let client = TestClient::new(server.base_url.clone());

    let body = create_comparison(&client).await;
    assert_eq!(body["outcome"]["status"], "degraded");
    assert_eq!(body["outcome"]["reason"], "No matching seed tracks were found.");

    let response = client.vote(body["id"].as_str().unwrap(), "first").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(server.world.vote_sink.votes().is_empty());
}

#[tokio::test]
async fn test_lost_vote_is_a_server_error() {
    let world = TestWorld::with(
        FixedInterpreter::new(query_with_seeds(
            DEFAULT_RAW_TARGETS,
            ACOUSTIC_ONLY_WEIGHTS,
            default_seeds(),
        )),
        MapLookup::with_default_seeds(),
        FakeRecommender::with_default_candidates(),
        MemoryVoteSink::broken(),
    );
    let server = TestServer::spawn_with(world).await;
    let client = TestClient::new(server.base_url.clone());
    let body = create_comparison(&client).await;

    let response = client.vote(body["id"].as_str().unwrap(), "tie").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_pending_comparisons_are_counted() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    create_comparison(&client).await;
    create_comparison(&client).await;

    let body: Value = client.home().await.json().await.unwrap();
    assert_eq!(body["pending_comparisons"], 2);
}
