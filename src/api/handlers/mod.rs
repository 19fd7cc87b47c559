//! REST endpoint handlers organized by resource.

pub mod character;
pub mod dm;
pub mod log;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(character::routes())
        .merge(log::routes())
        .merge(dm::routes())
}
