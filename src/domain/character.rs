//! Character metadata and list projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CharacterId;

/// A player character tracked by the ledger.
///
/// Holds sheet metadata only. Everything derived (level, tier, gold,
/// downtime, inventories) is recomputed from the log history on read and
/// never stored here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Character {
    /// Unique character identifier (immutable after creation).
    pub id: CharacterId,

    /// Character name.
    pub name: String,

    /// Adventurers League campaign the character plays in.
    pub campaign: String,

    /// Character race (may be empty).
    #[serde(default)]
    pub race: String,

    /// Character class (may be empty).
    #[serde(default)]
    pub class: String,

    /// Link to the hosted character sheet (may be empty).
    #[serde(default)]
    pub character_sheet_url: String,

    /// Link to a portrait image (may be empty).
    #[serde(default)]
    pub image_url: String,

    /// Server-side creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
}

/// Lightweight character row for list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CharacterRow {
    /// Character identifier.
    pub id: CharacterId,
    /// Character name.
    pub name: String,
    /// Campaign name.
    pub campaign: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of logs recorded against the character.
    pub log_count: usize,
}

impl CharacterRow {
    /// Builds a row from character metadata and its current log count.
    #[must_use]
    pub fn new(character: &Character, log_count: usize) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            campaign: character.campaign.clone(),
            created_at: character.created_at,
            log_count,
        }
    }
}
