//! End-to-end tests driving the REST router in-process.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use league_ledger::api;
use league_ledger::app_state::AppState;
use league_ledger::domain::{EventBus, Ledger};
use league_ledger::service::{CharacterService, SummaryCache};

fn make_app() -> Router {
    let ledger = Arc::new(Ledger::new());
    let cache = Arc::new(SummaryCache::new(true));
    let event_bus = EventBus::new(1000);
    let character_service = Arc::new(CharacterService::new(ledger, cache, event_bus.clone()));
    Router::new()
        .merge(api::build_router())
        .with_state(AppState {
            character_service,
            event_bus,
        })
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    let Ok(request) = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
    else {
        panic!("request construction failed");
    };
    request
}

fn get_request(uri: &str) -> Request<Body> {
    let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
        panic!("request construction failed");
    };
    request
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), 1024 * 1024).await else {
        panic!("body read failed");
    };
    let Ok(value) = serde_json::from_slice(&bytes) else {
        panic!("body is not JSON");
    };
    value
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("request failed");
    };
    response
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = make_app();
    let response = send(&app, get_request("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn tier_catalog_lists_four_brackets() {
    let app = make_app();
    let response = send(&app, get_request("/config/tiers")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let Some(tiers) = body.as_array() else {
        panic!("expected array");
    };
    assert_eq!(tiers.len(), 4);
    assert_eq!(tiers[0]["min_level"], 1);
    assert_eq!(tiers[3]["max_level"], 20);
}

#[tokio::test]
async fn character_lifecycle_derives_summary() {
    let app = make_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/characters",
            serde_json::json!({
                "name": "Tarly",
                "campaign": "Forgotten Realms",
                "race": "Human",
                "class": "Fighter"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/characters/{id}/logs"),
            serde_json::json!({
                "name": "The Hidden Shrine",
                "date": "2024-03-01T19:00:00Z",
                "level": 3,
                "gold": 50.0
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, get_request(&format!("/api/v1/characters/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = response_json(response).await;
    assert_eq!(detail["total_level"], 4);
    assert_eq!(detail["tier"], 1);
    assert_eq!(detail["total_gold"], 50.0);
    assert_eq!(detail["logs"].as_array().map(Vec::len), Some(1));

    let response = send(&app, get_request("/api/v1/characters")).await;
    let list = response_json(response).await;
    assert_eq!(list["pagination"]["total"], 1);
    assert_eq!(list["data"][0]["name"], "Tarly");
}

#[tokio::test]
async fn inventory_endpoint_applies_the_drop_boundary() {
    let app = make_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/characters",
            serde_json::json!({ "name": "Brenna", "campaign": "Eberron" }),
        ),
    )
    .await;
    let created = response_json(response).await;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    // Grant a potion on the first log.
    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/characters/{id}/logs"),
            serde_json::json!({
                "name": "first",
                "date": "2024-03-01T19:00:00Z",
                "magic_items_gained": [{ "name": "Potion of Healing" }]
            }),
        ),
    )
    .await;
    let first = response_json(response).await;
    let item_id = first["magic_items_gained"][0]["id"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    // Drop it on the second log.
    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/characters/{id}/logs"),
            serde_json::json!({
                "name": "second",
                "date": "2024-03-08T19:00:00Z",
                "magic_items_lost": [item_id]
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = response_json(response).await;
    let second_id = second["id"].as_str().unwrap_or_default().to_string();

    // Default resolution annotates the loss.
    let response = send(
        &app,
        get_request(&format!("/api/v1/characters/{id}/inventory")),
    )
    .await;
    let inventory = response_json(response).await;
    assert_eq!(inventory["data"][0]["lost_at"], second_id.as_str());

    // Editing the drop log still sees the item it drops.
    let response = send(
        &app,
        get_request(&format!(
            "/api/v1/characters/{id}/inventory?exclude_dropped=true&last_log_id={second_id}"
        )),
    )
    .await;
    let editing = response_json(response).await;
    assert_eq!(editing["data"].as_array().map(Vec::len), Some(1));

    // A brand-new log at the end of the timeline no longer does.
    let response = send(
        &app,
        get_request(&format!(
            "/api/v1/characters/{id}/inventory?exclude_dropped=true"
        )),
    )
    .await;
    let fresh = response_json(response).await;
    assert_eq!(fresh["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn dm_log_attach_flow() {
    let app = make_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/characters",
            serde_json::json!({ "name": "Quinn", "campaign": "Forgotten Realms" }),
        ),
    )
    .await;
    let created = response_json(response).await;
    let character_id = created["id"].as_str().unwrap_or_default().to_string();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/dm-logs",
            serde_json::json!({
                "name": "Ran the Hidden Shrine",
                "date": "2024-03-01T19:00:00Z",
                "level": 1,
                "dm": { "name": "Morgan", "dci": "1234567" }
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let dm_log = response_json(response).await;
    let log_id = dm_log["id"].as_str().unwrap_or_default().to_string();

    let response = send(&app, get_request("/api/v1/dm-logs?dm=Morgan")).await;
    let listed = response_json(response).await;
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));

    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/dm-logs/{log_id}/attach"),
            serde_json::json!({
                "character_id": character_id,
                "applied_date": "2024-04-01T12:00:00Z"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The pool is drained and the character leveled.
    let response = send(&app, get_request("/api/v1/dm-logs")).await;
    let pool = response_json(response).await;
    assert_eq!(pool["data"].as_array().map(Vec::len), Some(0));

    let response = send(
        &app,
        get_request(&format!("/api/v1/characters/{character_id}")),
    )
    .await;
    let detail = response_json(response).await;
    assert_eq!(detail["total_level"], 2);

    // The DM projection now knows Morgan.
    let response = send(&app, get_request("/api/v1/dms")).await;
    let dms = response_json(response).await;
    assert_eq!(dms["data"][0]["name"], "Morgan");
    assert_eq!(dms["data"][0]["log_count"], 1);
}

#[tokio::test]
async fn errors_use_the_structured_body() {
    let app = make_app();

    let missing = uuid::Uuid::new_v4();
    let response = send(&app, get_request(&format!("/api/v1/characters/{missing}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], 2001);

    // Blank character name is a validation error.
    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/characters",
            serde_json::json!({ "name": "  ", "campaign": "Eberron" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn level_cap_violations_are_unprocessable() {
    let app = make_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/characters",
            serde_json::json!({ "name": "Vex", "campaign": "Eberron" }),
        ),
    )
    .await;
    let created = response_json(response).await;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/characters/{id}/logs"),
            serde_json::json!({
                "name": "marathon",
                "date": "2024-03-01T19:00:00Z",
                "level": 19
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/v1/characters/{id}/logs"),
            serde_json::json!({
                "name": "one too many",
                "date": "2024-03-02T19:00:00Z",
                "level": 1
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], 4001);
}
