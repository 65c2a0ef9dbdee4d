use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{log_requests, state::*, ServerConfig};
use crate::harness::HarnessError;
use crate::votes::VoteChoice;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub catalog_rows: usize,
    pub pending_comparisons: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct CompareBody {
    pub prompt: String,
}

#[derive(Deserialize, Debug)]
struct VoteBody {
    pub choice: VoteChoice,
}

#[derive(Serialize)]
struct VoteAccepted {
    comparison_id: Uuid,
    choice: VoteChoice,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        catalog_rows: state.catalog.row_count(),
        pending_comparisons: state.harness.pending_count(),
    };
    Json(stats)
}

async fn post_compare(
    State(harness): State<GuardedHarness>,
    Json(body): Json<CompareBody>,
) -> Response {
    if body.prompt.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "prompt must not be empty");
    }
    let comparison = harness.compare(&body.prompt).await;
    Json(comparison).into_response()
}

async fn post_vote(
    State(harness): State<GuardedHarness>,
    Path(id): Path<Uuid>,
    Json(body): Json<VoteBody>,
) -> Response {
    match harness.record_vote(id, body.choice).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(VoteAccepted {
                comparison_id: record.comparison_id,
                choice: record.choice,
            }),
        )
            .into_response(),
        Err(err) => {
            let status = match &err {
                HarnessError::UnknownComparison(_) => StatusCode::NOT_FOUND,
                HarnessError::AlreadyVoted(_) => StatusCode::CONFLICT,
                HarnessError::VoteNotAllowed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                HarnessError::Sink(_) => {
                    error!("Vote for {} lost: {}", id, err);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            error_response(status, err.to_string())
        }
    }
}

async fn get_catalog_row(
    State(catalog): State<GuardedCatalogStore>,
    Path(index): Path<usize>,
) -> Response {
    match catalog.row(index) {
        Some(row) => Json(row).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn make_app(
    config: ServerConfig,
    catalog: GuardedCatalogStore,
    harness: GuardedHarness,
) -> Router {
    let state = ServerState::new(config, catalog, harness);

    let compare_routes: Router = Router::new()
        .route("/", post(post_compare))
        .route("/{id}/vote", post(post_vote))
        .with_state(state.clone());

    let catalog_routes: Router = Router::new()
        .route("/row/{index}", get(get_catalog_row))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .nest("/v1/compare", compare_routes)
        .nest("/v1/catalog", catalog_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    catalog: GuardedCatalogStore,
    harness: GuardedHarness,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, catalog, harness);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
