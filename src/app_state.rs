//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::CharacterService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Character service for all business logic.
    pub character_service: Arc<CharacterService>,
    /// Event bus for audit logging and future subscribers.
    pub event_bus: EventBus,
}
