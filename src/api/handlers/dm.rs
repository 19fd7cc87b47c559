//! Dungeon-master projection handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DmDetailResponse, DmListResponse, DmRowDto};
use crate::app_state::AppState;
use crate::domain::DungeonMasterId;
use crate::error::{ErrorResponse, LedgerError};

/// `GET /dms` — List dungeon masters.
#[utoipa::path(
    get,
    path = "/api/v1/dms",
    tag = "Dungeon Masters",
    summary = "List dungeon masters",
    description = "Groups every log in the ledger by its credited DM. The projection covers attached character logs and the unattached DM-log pool.",
    responses(
        (status = 200, description = "DM list", body = DmListResponse),
    )
)]
pub async fn list_dms(State(state): State<AppState>) -> impl IntoResponse {
    let records = state.character_service.dungeon_masters().await;
    Json(DmListResponse {
        data: records.iter().map(DmRowDto::from).collect(),
    })
}

/// `GET /dms/:id` — Get one DM with their logs.
///
/// # Errors
///
/// Returns [`LedgerError::DungeonMasterNotFound`] if no log credits the
/// given DM.
#[utoipa::path(
    get,
    path = "/api/v1/dms/{id}",
    tag = "Dungeon Masters",
    summary = "Get dungeon master details",
    params(
        ("id" = uuid::Uuid, Path, description = "Dungeon master UUID"),
    ),
    responses(
        (status = 200, description = "DM details", body = DmDetailResponse),
        (status = 404, description = "DM not found", body = ErrorResponse),
    )
)]
pub async fn get_dm(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LedgerError> {
    let record = state
        .character_service
        .dungeon_master(DungeonMasterId::from_uuid(id))
        .await?;
    Ok(Json(DmDetailResponse::from(&record)))
}

/// Dungeon master routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dms", get(list_dms))
        .route("/dms/{id}", get(get_dm))
}
