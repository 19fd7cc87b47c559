//! Character CRUD handlers: create, list, get, update, delete, and the
//! inventory endpoint exposing the resolver's filter surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CharacterDetailResponse, CharacterListQuery, CharacterListResponse, CharacterRequest,
    CharacterRowDto, CreateCharacterResponse, InventoryQuery, PaginationMeta, PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::{CharacterId, InventoryFilter, ItemKind, LogId, stacking};
use crate::error::{ErrorResponse, LedgerError};

/// `POST /characters` — Create a new character.
///
/// # Errors
///
/// Returns [`LedgerError`] when the name or campaign is blank.
#[utoipa::path(
    post,
    path = "/api/v1/characters",
    tag = "Characters",
    summary = "Create a new character",
    description = "Creates a character with sheet metadata. Derived statistics start at the fresh-character baseline: level 1, tier 1, zero totals.",
    request_body = CharacterRequest,
    responses(
        (status = 201, description = "Character created successfully", body = CreateCharacterResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_character(
    State(state): State<AppState>,
    Json(req): Json<CharacterRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let character = state.character_service.create_character(req.into()).await?;

    let response = CreateCharacterResponse {
        id: character.id,
        name: character.name,
        campaign: character.campaign,
        created_at: character.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /characters` — List characters with pagination and optional
/// campaign filter.
#[utoipa::path(
    get,
    path = "/api/v1/characters",
    tag = "Characters",
    summary = "List characters",
    description = "Returns a paginated list of all characters, optionally filtered by campaign.",
    params(PaginationParams, CharacterListQuery),
    responses(
        (status = 200, description = "Paginated character list", body = CharacterListResponse),
    )
)]
pub async fn list_characters(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<CharacterListQuery>,
) -> impl IntoResponse {
    let params = params.clamped();
    let rows = state
        .character_service
        .list_characters(filter.campaign.as_deref())
        .await;

    let total = rows.len() as u32;
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
    let data: Vec<CharacterRowDto> = rows
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .map(|row| CharacterRowDto {
            id: row.id,
            name: row.name,
            campaign: row.campaign,
            created_at: row.created_at,
            log_count: row.log_count,
        })
        .collect();

    Json(CharacterListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    })
}

/// `GET /characters/:id` — Get a character with summary and history.
///
/// # Errors
///
/// Returns [`LedgerError::CharacterNotFound`] if the character does not
/// exist.
#[utoipa::path(
    get,
    path = "/api/v1/characters/{id}",
    tag = "Characters",
    summary = "Get character details",
    description = "Returns sheet metadata, the derived summary (level, tier, gold, downtime, per-log levels), current inventories, and the ordered log history.",
    params(
        ("id" = uuid::Uuid, Path, description = "Character UUID"),
    ),
    responses(
        (status = 200, description = "Character details", body = CharacterDetailResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
    )
)]
pub async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LedgerError> {
    let character_id = CharacterId::from_uuid(id);
    let view = state.character_service.get_character(character_id).await?;
    Ok(Json(CharacterDetailResponse::from(view)))
}

/// `PUT /characters/:id` — Edit character sheet metadata.
///
/// # Errors
///
/// Returns [`LedgerError`] on blank fields or a missing character.
#[utoipa::path(
    put,
    path = "/api/v1/characters/{id}",
    tag = "Characters",
    summary = "Update a character",
    description = "Replaces the character's sheet metadata. The log history is untouched.",
    params(
        ("id" = uuid::Uuid, Path, description = "Character UUID"),
    ),
    request_body = CharacterRequest,
    responses(
        (status = 200, description = "Character updated", body = CreateCharacterResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
    )
)]
pub async fn update_character(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CharacterRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let character_id = CharacterId::from_uuid(id);
    let character = state
        .character_service
        .update_character(character_id, req.into())
        .await?;

    Ok(Json(CreateCharacterResponse {
        id: character.id,
        name: character.name,
        campaign: character.campaign,
        created_at: character.created_at,
    }))
}

/// `DELETE /characters/:id` — Remove a character and its history.
///
/// # Errors
///
/// Returns [`LedgerError::CharacterNotFound`] if the character does not
/// exist.
#[utoipa::path(
    delete,
    path = "/api/v1/characters/{id}",
    tag = "Characters",
    summary = "Delete a character",
    description = "Removes a character together with its entire log history.",
    params(
        ("id" = uuid::Uuid, Path, description = "Character UUID"),
    ),
    responses(
        (status = 204, description = "Character deleted"),
        (status = 404, description = "Character not found", body = ErrorResponse),
    )
)]
pub async fn delete_character(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LedgerError> {
    let character_id = CharacterId::from_uuid(id);
    state.character_service.delete_character(character_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /characters/:id/inventory` — Resolve the character's inventory.
///
/// # Errors
///
/// Returns [`LedgerError`] on an unknown character or kind.
#[utoipa::path(
    get,
    path = "/api/v1/characters/{id}/inventory",
    tag = "Characters",
    summary = "Resolve a character's inventory",
    description = "Replays the log history into the magic item or story award inventory. `exclude_dropped` with `last_log_id` narrows to what could still be dropped as of editing that log; `stacked` consolidates repeated grants for display.",
    params(
        ("id" = uuid::Uuid, Path, description = "Character UUID"),
        InventoryQuery,
    ),
    responses(
        (status = 200, description = "Resolved inventory", body = serde_json::Value),
        (status = 400, description = "Unknown inventory kind", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
    )
)]
pub async fn character_inventory(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<InventoryQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    let character_id = CharacterId::from_uuid(id);
    let kind = parse_kind(query.kind.as_deref())?;
    let filter = InventoryFilter {
        exclude_dropped: query.exclude_dropped,
        last_log_id: query.last_log_id.map(LogId::from_uuid),
    };

    let possessions = state
        .character_service
        .character_inventory(character_id, kind, filter)
        .await?;

    let response = if query.stacked {
        serde_json::json!({ "data": stacking::stacked_sorted(&possessions) })
    } else {
        serde_json::json!({ "data": possessions })
    };

    Ok(Json(response))
}

/// Parses the inventory kind query value.
fn parse_kind(kind: Option<&str>) -> Result<ItemKind, LedgerError> {
    match kind {
        None | Some("magic_item") => Ok(ItemKind::MagicItem),
        Some("story_award") => Ok(ItemKind::StoryAward),
        Some(other) => Err(LedgerError::InvalidRequest(format!(
            "unknown inventory kind: {other}"
        ))),
    }
}

/// Character management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/characters",
            axum::routing::post(create_character).get(list_characters),
        )
        .route(
            "/characters/{id}",
            get(get_character)
                .put(update_character)
                .delete(delete_character),
        )
        .route("/characters/{id}/inventory", get(character_inventory))
}
