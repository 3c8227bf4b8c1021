//! `GET /logs?range=<selector>` over the CSV store.

use super::{range_start, read_since, LogRow};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

#[derive(Clone)]
pub struct QueryState {
    store_path: Arc<PathBuf>,
    default_range: Arc<str>,
}

impl QueryState {
    pub fn new(store_path: impl Into<PathBuf>, default_range: &str) -> Self {
        Self {
            store_path: Arc::new(store_path.into()),
            default_range: Arc::from(default_range),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogsParams {
    range: Option<String>,
}

pub fn router(state: QueryState) -> Router {
    Router::new()
        .route("/logs", get(logs_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn logs_handler(
    State(state): State<QueryState>,
    Query(params): Query<LogsParams>,
) -> Result<Json<Vec<LogRow>>, (StatusCode, Json<Value>)> {
    let selector = params.range.as_deref().unwrap_or(&state.default_range);
    let since = range_start(Utc::now(), selector);

    let path = Arc::clone(&state.store_path);
    let read = tokio::task::spawn_blocking(move || read_since(&path, since)).await;
    match read {
        Ok(Ok(rows)) => Ok(Json(rows)),
        Ok(Err(e)) => {
            warn!(error = %e, "store read failed");
            Err(server_error())
        }
        Err(e) => {
            warn!(error = %e, "store read task failed");
            Err(server_error())
        }
    }
}

fn server_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to read CSV" })),
    )
}
