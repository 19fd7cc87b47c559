//! System endpoints: health check and the tier catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Adventurers League tier bracket info.
#[derive(Debug, Serialize, ToSchema)]
struct TierInfo {
    tier: u8,
    min_level: u32,
    max_level: u32,
    description: &'static str,
}

/// `GET /config/tiers` — The league's tier table.
#[utoipa::path(
    get,
    path = "/config/tiers",
    tag = "System",
    summary = "List league tiers",
    description = "Returns the level brackets used to classify characters into tiers. Boundary levels belong to the higher tier.",
    responses(
        (status = 200, description = "Tier catalog", body = Vec<TierInfo>),
    )
)]
pub async fn tiers_handler() -> impl IntoResponse {
    let tiers = vec![
        TierInfo {
            tier: 1,
            min_level: 1,
            max_level: 4,
            description: "Local heroes",
        },
        TierInfo {
            tier: 2,
            min_level: 5,
            max_level: 10,
            description: "Heroes of the realm",
        },
        TierInfo {
            tier: 3,
            min_level: 11,
            max_level: 16,
            description: "Masters of the realm",
        },
        TierInfo {
            tier: 4,
            min_level: 17,
            max_level: 20,
            description: "Masters of the world",
        },
    ];
    (StatusCode::OK, Json(tiers))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/tiers", get(tiers_handler))
}
