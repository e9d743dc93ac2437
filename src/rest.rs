// Copyright 2026 Zalo Proxy Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST surface.
//!
//! Thin plumbing over [`LookupService`]: every endpoint carries permissive
//! CORS headers and maps pipeline outcomes to JSON responses. No
//! authentication by design.

use crate::config::FetchStrategyKind;
use crate::error::LookupError;
use crate::lookup::{LookupService, LookupStatus};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};

/// Bound on the raw-document preview returned by the debug endpoint.
const DEBUG_PREVIEW_BYTES: usize = 4096;

/// Shared state passed to all handlers.
pub struct AppState {
    pub service: LookupService,
    pub strategy: FetchStrategyKind,
    pub started_at: Instant,
}

/// Build the axum Router with permissive CORS on every route.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/lookup", get(handle_lookup))
        .route("/api/debug", get(handle_debug))
        .route("/cache/clear", post(handle_cache_clear))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until `shutdown` is notified.
pub async fn start(port: u16, state: Arc<AppState>, shutdown: Arc<Notify>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("lookup proxy listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await?;
    Ok(())
}

#[derive(Deserialize, Default)]
struct PhoneParams {
    phone: Option<String>,
}

/// Discovery document listing the endpoints.
async fn index() -> Json<Value> {
    Json(json!({
        "message": "Zalo Lookup Proxy",
        "endpoints": {
            "lookup": "/api/lookup?phone=0398981698",
            "debug": "/api/debug?phone=0398981698",
            "health": "/health",
            "clear_cache": "/cache/clear (POST)",
        },
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "cache_size": state.service.cache().len().await,
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

async fn handle_lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PhoneParams>,
) -> (StatusCode, Json<Value>) {
    let Some(phone) = params.phone else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": LookupError::MissingPhone.to_string() })),
        );
    };

    match state.service.lookup(&phone).await {
        Ok(result) => (
            StatusCode::OK,
            Json(serde_json::to_value(&result).unwrap_or_default()),
        ),
        Err(e) => {
            tracing::warn!("lookup failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "phone": state.service.normalize(&phone).as_str(),
                    "name": "",
                    "status": LookupStatus::Error,
                    "error": e.to_string(),
                })),
            )
        }
    }
}

/// Bounded plain-text preview of the raw fetched document, for diagnosing
/// extraction failures. Answers only under the static strategy — spinning up
/// a browser session for an unauthenticated debug route is not worth it.
async fn handle_debug(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PhoneParams>,
) -> Response {
    if state.strategy != FetchStrategyKind::Static {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "debug endpoint is only available with the static fetch strategy"
            })),
        )
            .into_response();
    }

    let Some(phone) = params.phone else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": LookupError::MissingPhone.to_string() })),
        )
            .into_response();
    };

    match state.service.fetch_raw(&phone).await {
        Ok(doc) => {
            let mut preview = doc.html;
            if preview.len() > DEBUG_PREVIEW_BYTES {
                let mut cut = DEBUG_PREVIEW_BYTES;
                while !preview.is_char_boundary(cut) {
                    cut -= 1;
                }
                preview.truncate(cut);
            }
            (StatusCode::OK, preview).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn handle_cache_clear(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cleared = state.service.cache().clear().await;
    tracing::info!("cache cleared: {cleared} entry(s) removed");
    Json(json!({
        "message": "Cache cleared",
        "cleared": cleared,
        "cache_size": 0,
    }))
}
