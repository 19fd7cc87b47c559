//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; system endpoints
//! (`/health`, `/config/tiers`) live at the root. With the `swagger-ui`
//! feature enabled the OpenAPI document is served at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// OpenAPI document covering every REST endpoint.
#[cfg(feature = "swagger-ui")]
#[derive(Debug, utoipa::OpenApi)]
#[openapi(
    info(
        title = "league-ledger",
        description = "REST API for tracking D&D Adventurers League character progression."
    ),
    paths(
        handlers::character::create_character,
        handlers::character::list_characters,
        handlers::character::get_character,
        handlers::character::update_character,
        handlers::character::delete_character,
        handlers::character::character_inventory,
        handlers::log::append_log,
        handlers::log::update_log,
        handlers::log::delete_log,
        handlers::log::create_dm_log,
        handlers::log::list_dm_logs,
        handlers::log::get_dm_log,
        handlers::log::update_dm_log,
        handlers::log::delete_dm_log,
        handlers::log::attach_dm_log,
        handlers::dm::list_dms,
        handlers::dm::get_dm,
        handlers::system::health_handler,
        handlers::system::tiers_handler,
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    };

    router
}
