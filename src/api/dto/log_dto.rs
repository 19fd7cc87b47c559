//! Log DTOs shared by character-log and DM-log endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CharacterId, DungeonMaster, ItemGrant, ItemId, LogEntry, LogId, LogKind,
};
use crate::service::{DmDraft, GrantDraft, LogDraft};

/// The credited DM in a log write request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DmRequest {
    /// DM display name.
    pub name: String,
    /// Optional DCI number, up to 10 digits.
    #[serde(default)]
    pub dci: Option<String>,
}

/// A granted item in a log write request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrantRequest {
    /// Existing grant id; omit for new grants.
    #[serde(default)]
    pub id: Option<ItemId>,
    /// Item or award name (required).
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// Request body for log create and update endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogRequest {
    /// Session or transaction title (required).
    pub name: String,
    /// Session date.
    pub date: DateTime<Utc>,
    /// Game session or non-game transaction. Defaults to `game`.
    #[serde(default = "default_kind")]
    pub kind: LogKind,
    /// Experience points gained.
    #[serde(default)]
    pub experience: i64,
    /// Advancement checkpoints gained.
    #[serde(default)]
    pub acp: u32,
    /// Treasure checkpoints delta.
    #[serde(default)]
    pub tcp: i32,
    /// Levels gained.
    #[serde(default)]
    pub level: u32,
    /// Gold delta, signed.
    #[serde(default)]
    pub gold: f64,
    /// Downtime days delta, signed.
    #[serde(default)]
    pub dtd: i32,
    /// Session notes.
    #[serde(default)]
    pub description: String,
    /// Credited DM.
    #[serde(default)]
    pub dm: Option<DmRequest>,
    /// Magic items granted.
    #[serde(default)]
    pub magic_items_gained: Vec<GrantRequest>,
    /// Magic items dropped, by grant id.
    #[serde(default)]
    pub magic_items_lost: Vec<ItemId>,
    /// Story awards granted.
    #[serde(default)]
    pub story_awards_gained: Vec<GrantRequest>,
    /// Story awards dropped, by grant id.
    #[serde(default)]
    pub story_awards_lost: Vec<ItemId>,
}

const fn default_kind() -> LogKind {
    LogKind::Game
}

impl From<LogRequest> for LogDraft {
    fn from(req: LogRequest) -> Self {
        let grants = |reqs: Vec<GrantRequest>| -> Vec<GrantDraft> {
            reqs.into_iter()
                .map(|g| GrantDraft {
                    id: g.id,
                    name: g.name,
                    description: g.description,
                })
                .collect()
        };
        Self {
            name: req.name,
            date: req.date,
            kind: req.kind,
            experience: req.experience,
            acp: req.acp,
            tcp: req.tcp,
            level: req.level,
            gold: req.gold,
            dtd: req.dtd,
            description: req.description,
            dm: req.dm.map(|dm| DmDraft {
                name: dm.name,
                dci: dm.dci,
            }),
            magic_items_gained: grants(req.magic_items_gained),
            magic_items_lost: req.magic_items_lost,
            story_awards_gained: grants(req.story_awards_gained),
            story_awards_lost: req.story_awards_lost,
        }
    }
}

/// A log entry as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogDto {
    /// Log identifier.
    pub id: LogId,
    /// Session or transaction title.
    pub name: String,
    /// Session date.
    pub date: DateTime<Utc>,
    /// Applied date for attached DM logs.
    pub applied_date: Option<DateTime<Utc>>,
    /// Game session or non-game transaction.
    pub kind: LogKind,
    /// Whether the entry is DM-authored.
    pub is_dm_log: bool,
    /// Owning character, `None` for unattached DM logs.
    pub character_id: Option<CharacterId>,
    /// Credited DM.
    pub dm: Option<DungeonMaster>,
    /// Experience points gained.
    pub experience: i64,
    /// Advancement checkpoints gained.
    pub acp: u32,
    /// Treasure checkpoints delta.
    pub tcp: i32,
    /// Levels gained.
    pub level: u32,
    /// Gold delta.
    pub gold: f64,
    /// Downtime days delta.
    pub dtd: i32,
    /// Session notes.
    pub description: String,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Magic items granted.
    pub magic_items_gained: Vec<ItemGrant>,
    /// Magic items dropped, by grant id.
    pub magic_items_lost: Vec<ItemId>,
    /// Story awards granted.
    pub story_awards_gained: Vec<ItemGrant>,
    /// Story awards dropped, by grant id.
    pub story_awards_lost: Vec<ItemId>,
}

impl From<&LogEntry> for LogDto {
    fn from(log: &LogEntry) -> Self {
        Self {
            id: log.id,
            name: log.name.clone(),
            date: log.date,
            applied_date: log.applied_date,
            kind: log.kind,
            is_dm_log: log.is_dm_log,
            character_id: log.character_id,
            dm: log.dm.clone(),
            experience: log.experience,
            acp: log.acp,
            tcp: log.tcp,
            level: log.level,
            gold: log.gold,
            dtd: log.dtd,
            description: log.description.clone(),
            created_at: log.created_at,
            magic_items_gained: log.magic_items_gained.clone(),
            magic_items_lost: log.magic_items_lost.clone(),
            story_awards_gained: log.story_awards_gained.clone(),
            story_awards_lost: log.story_awards_lost.clone(),
        }
    }
}

/// Response body for DM-log list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogListResponse {
    /// Log entries ascending by effective date.
    pub data: Vec<LogDto>,
}

/// Query parameters for `GET /dm-logs`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DmLogListQuery {
    /// Restrict the list to logs credited to this DM name.
    #[serde(default)]
    pub dm: Option<String>,
}

/// Request body for `POST /dm-logs/{id}/attach`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachLogRequest {
    /// Receiving character.
    pub character_id: uuid::Uuid,
    /// Date the log takes effect in the character's timeline.
    pub applied_date: DateTime<Utc>,
}
