//! Log handlers: character-log CRUD plus the unattached DM-log pool and
//! its attach operation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    AttachLogRequest, DmLogListQuery, LogDto, LogListResponse, LogRequest,
};
use crate::app_state::AppState;
use crate::domain::{CharacterId, LogId};
use crate::error::{ErrorResponse, LedgerError};

/// `POST /characters/:id/logs` — Append a log to a character.
///
/// # Errors
///
/// Returns [`LedgerError`] on validation failure, a crossed level cap,
/// or an unresolvable loss reference.
#[utoipa::path(
    post,
    path = "/api/v1/characters/{id}/logs",
    tag = "Logs",
    summary = "Append a log",
    description = "Appends a session or non-game transaction to the character's history. Level deltas past level 20 and loss references that do not resolve to a held item are refused.",
    params(
        ("id" = uuid::Uuid, Path, description = "Character UUID"),
    ),
    request_body = LogRequest,
    responses(
        (status = 201, description = "Log appended", body = LogDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
        (status = 422, description = "Level cap or loss reference violation", body = ErrorResponse),
    )
)]
pub async fn append_log(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<LogRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let character_id = CharacterId::from_uuid(id);
    let log = state
        .character_service
        .append_log(character_id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(LogDto::from(&log))))
}

/// `PUT /characters/:id/logs/:log_id` — Edit a log in place.
///
/// # Errors
///
/// As for [`append_log`], plus [`LedgerError::LogNotFound`].
#[utoipa::path(
    put,
    path = "/api/v1/characters/{id}/logs/{log_id}",
    tag = "Logs",
    summary = "Update a log",
    description = "Replaces a log's content while preserving its identity, DM-log flag, and applied date. A drop recorded on the edited log itself remains valid.",
    params(
        ("id" = uuid::Uuid, Path, description = "Character UUID"),
        ("log_id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    request_body = LogRequest,
    responses(
        (status = 200, description = "Log updated", body = LogDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Character or log not found", body = ErrorResponse),
        (status = 422, description = "Level cap or loss reference violation", body = ErrorResponse),
    )
)]
pub async fn update_log(
    State(state): State<AppState>,
    Path((id, log_id)): Path<(uuid::Uuid, uuid::Uuid)>,
    Json(req): Json<LogRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let character_id = CharacterId::from_uuid(id);
    let log = state
        .character_service
        .update_log(character_id, LogId::from_uuid(log_id), req.into())
        .await?;
    Ok(Json(LogDto::from(&log)))
}

/// `DELETE /characters/:id/logs/:log_id` — Delete a log.
///
/// # Errors
///
/// Returns [`LedgerError`] when the character or log does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/characters/{id}/logs/{log_id}",
    tag = "Logs",
    summary = "Delete a log",
    description = "Removes a log. Items it dropped become held again; loss references against its grants are stripped.",
    params(
        ("id" = uuid::Uuid, Path, description = "Character UUID"),
        ("log_id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    responses(
        (status = 204, description = "Log deleted"),
        (status = 404, description = "Character or log not found", body = ErrorResponse),
    )
)]
pub async fn delete_log(
    State(state): State<AppState>,
    Path((id, log_id)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<impl IntoResponse, LedgerError> {
    let character_id = CharacterId::from_uuid(id);
    state
        .character_service
        .delete_log(character_id, LogId::from_uuid(log_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /dm-logs` — Create an unattached DM log.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidRequest`] when the draft is blank or
/// tries to drop items.
#[utoipa::path(
    post,
    path = "/api/v1/dm-logs",
    tag = "DM Logs",
    summary = "Create a DM log",
    description = "Records a session from the DM's side of the table. The log stays in the pool until attached to a character.",
    request_body = LogRequest,
    responses(
        (status = 201, description = "DM log created", body = LogDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_dm_log(
    State(state): State<AppState>,
    Json(req): Json<LogRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let log = state.character_service.create_dm_log(req.into()).await?;
    Ok((StatusCode::CREATED, Json(LogDto::from(&log))))
}

/// `GET /dm-logs` — List unattached DM logs.
#[utoipa::path(
    get,
    path = "/api/v1/dm-logs",
    tag = "DM Logs",
    summary = "List DM logs",
    description = "Returns the unattached DM-log pool, optionally filtered by DM name, ascending by date.",
    params(DmLogListQuery),
    responses(
        (status = 200, description = "DM log list", body = LogListResponse),
    )
)]
pub async fn list_dm_logs(
    State(state): State<AppState>,
    Query(query): Query<DmLogListQuery>,
) -> impl IntoResponse {
    let logs = state
        .character_service
        .list_dm_logs(query.dm.as_deref())
        .await;
    Json(LogListResponse {
        data: logs.iter().map(LogDto::from).collect(),
    })
}

/// `GET /dm-logs/:id` — Get an unattached DM log.
///
/// # Errors
///
/// Returns [`LedgerError::LogNotFound`] if the pool holds no such log.
#[utoipa::path(
    get,
    path = "/api/v1/dm-logs/{id}",
    tag = "DM Logs",
    summary = "Get a DM log",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    responses(
        (status = 200, description = "DM log", body = LogDto),
        (status = 404, description = "Log not found", body = ErrorResponse),
    )
)]
pub async fn get_dm_log(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LedgerError> {
    let log = state
        .character_service
        .get_dm_log(LogId::from_uuid(id))
        .await?;
    Ok(Json(LogDto::from(&log)))
}

/// `PUT /dm-logs/:id` — Edit an unattached DM log.
///
/// # Errors
///
/// As for [`create_dm_log`], plus [`LedgerError::LogNotFound`].
#[utoipa::path(
    put,
    path = "/api/v1/dm-logs/{id}",
    tag = "DM Logs",
    summary = "Update a DM log",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    request_body = LogRequest,
    responses(
        (status = 200, description = "DM log updated", body = LogDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Log not found", body = ErrorResponse),
    )
)]
pub async fn update_dm_log(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<LogRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let log = state
        .character_service
        .update_dm_log(LogId::from_uuid(id), req.into())
        .await?;
    Ok(Json(LogDto::from(&log)))
}

/// `DELETE /dm-logs/:id` — Delete an unattached DM log.
///
/// # Errors
///
/// Returns [`LedgerError::LogNotFound`] if the pool holds no such log.
#[utoipa::path(
    delete,
    path = "/api/v1/dm-logs/{id}",
    tag = "DM Logs",
    summary = "Delete a DM log",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    responses(
        (status = 204, description = "DM log deleted"),
        (status = 404, description = "Log not found", body = ErrorResponse),
    )
)]
pub async fn delete_dm_log(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LedgerError> {
    state
        .character_service
        .delete_dm_log(LogId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /dm-logs/:id/attach` — Apply a DM log to a character.
///
/// # Errors
///
/// Returns [`LedgerError`] when the log or character does not exist,
/// the log is already attached, or the level cap would be crossed.
#[utoipa::path(
    post,
    path = "/api/v1/dm-logs/{id}/attach",
    tag = "DM Logs",
    summary = "Attach a DM log to a character",
    description = "Moves the log out of the pool and into the character's history, ordered by the applied date rather than the session date.",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    request_body = AttachLogRequest,
    responses(
        (status = 200, description = "DM log attached", body = LogDto),
        (status = 404, description = "Log or character not found", body = ErrorResponse),
        (status = 409, description = "Log already attached", body = ErrorResponse),
        (status = 422, description = "Level cap violation", body = ErrorResponse),
    )
)]
pub async fn attach_dm_log(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AttachLogRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let log = state
        .character_service
        .attach_dm_log(
            LogId::from_uuid(id),
            CharacterId::from_uuid(req.character_id),
            req.applied_date,
        )
        .await?;
    Ok(Json(LogDto::from(&log)))
}

/// Log routes for characters and the DM pool.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/characters/{id}/logs", post(append_log))
        .route(
            "/characters/{id}/logs/{log_id}",
            put(update_log).delete(delete_log),
        )
        .route("/dm-logs", post(create_dm_log).get(list_dm_logs))
        .route(
            "/dm-logs/{id}",
            get(get_dm_log).put(update_dm_log).delete(delete_dm_log),
        )
        .route("/dm-logs/{id}/attach", post(attach_dm_log))
}
