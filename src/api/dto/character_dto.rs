//! Character-related DTOs for create, get, and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use super::log_dto::LogDto;
use crate::domain::{CharacterId, LogLevels, Possession};
use crate::service::{CharacterDraft, CharacterView};

/// Request body for `POST /characters` and `PUT /characters/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CharacterRequest {
    /// Character name (required).
    pub name: String,
    /// Campaign name (required).
    pub campaign: String,
    /// Race.
    #[serde(default)]
    pub race: String,
    /// Class.
    #[serde(default)]
    pub class: String,
    /// Character sheet link.
    #[serde(default)]
    pub character_sheet_url: String,
    /// Portrait link.
    #[serde(default)]
    pub image_url: String,
}

impl From<CharacterRequest> for CharacterDraft {
    fn from(req: CharacterRequest) -> Self {
        Self {
            name: req.name,
            campaign: req.campaign,
            race: req.race,
            class: req.class,
            character_sheet_url: req.character_sheet_url,
            image_url: req.image_url,
        }
    }
}

/// Response body for `POST /characters` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCharacterResponse {
    /// Unique character identifier.
    pub id: CharacterId,
    /// Character name echoed from request.
    pub name: String,
    /// Campaign echoed from request.
    pub campaign: String,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Character row for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct CharacterRowDto {
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

/// Paginated list response for `GET /characters`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CharacterListResponse {
    /// Character rows.
    pub data: Vec<CharacterRowDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Query parameters for `GET /characters`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CharacterListQuery {
    /// Restrict rows to one campaign.
    #[serde(default)]
    pub campaign: Option<String>,
}

/// Full character detail for `GET /characters/{id}`: sheet metadata,
/// the derived summary, current inventories, and the ordered history.
#[derive(Debug, Serialize, ToSchema)]
pub struct CharacterDetailResponse {
    /// Character identifier.
    pub id: CharacterId,
    /// Character name.
    pub name: String,
    /// Campaign name.
    pub campaign: String,
    /// Race.
    pub race: String,
    /// Class.
    pub class: String,
    /// Character sheet link.
    pub character_sheet_url: String,
    /// Portrait link.
    pub image_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current level: 1 + the sum of all level deltas.
    pub total_level: u32,
    /// Adventurers League tier for the current level.
    pub tier: u8,
    /// Net gold.
    pub total_gold: f64,
    /// Net downtime days.
    pub total_dtd: i32,
    /// Per-log level contributions in log order.
    pub log_levels: Vec<LogLevels>,
    /// Magic items currently held, in grant order.
    pub magic_items: Vec<Possession>,
    /// Story awards currently held, in grant order.
    pub story_awards: Vec<Possession>,
    /// Log history ascending by effective date.
    pub logs: Vec<LogDto>,
}

impl From<CharacterView> for CharacterDetailResponse {
    fn from(view: CharacterView) -> Self {
        Self {
            id: view.character.id,
            name: view.character.name,
            campaign: view.character.campaign,
            race: view.character.race,
            class: view.character.class,
            character_sheet_url: view.character.character_sheet_url,
            image_url: view.character.image_url,
            created_at: view.character.created_at,
            total_level: view.summary.total_level,
            tier: view.summary.tier,
            total_gold: view.summary.total_gold,
            total_dtd: view.summary.total_dtd,
            log_levels: view.summary.log_levels.clone(),
            magic_items: view.magic_items,
            story_awards: view.story_awards,
            logs: view.logs.iter().map(LogDto::from).collect(),
        }
    }
}

/// Query parameters for `GET /characters/{id}/inventory`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct InventoryQuery {
    /// Inventory kind: `magic_item` (default) or `story_award`.
    #[serde(default)]
    pub kind: Option<String>,
    /// Exclude entries already dropped as of `last_log_id`.
    #[serde(default)]
    pub exclude_dropped: bool,
    /// Reference log for the exclusion boundary. Absent means a
    /// brand-new log at the end of the timeline.
    #[serde(default)]
    pub last_log_id: Option<uuid::Uuid>,
    /// Consolidate repeated grants into display stacks.
    #[serde(default)]
    pub stacked: bool,
}
