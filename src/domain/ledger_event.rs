//! Domain events reflecting ledger mutations.
//!
//! Every state change emits a [`LedgerEvent`] through the
//! [`super::EventBus`]. Events drive key-tagged cache invalidation in
//! the service layer and are traced by the audit logger task.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CharacterId, LogId};

/// Domain event emitted after every ledger mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Emitted when a new character is created.
    CharacterCreated {
        /// Character identifier.
        character_id: CharacterId,
        /// Character name at creation time.
        name: String,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when character sheet metadata is edited.
    CharacterUpdated {
        /// Character identifier.
        character_id: CharacterId,
        /// Update timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a character is removed.
    CharacterRemoved {
        /// Character identifier.
        character_id: CharacterId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a log is appended to a character or the DM pool.
    LogAppended {
        /// Owning character, `None` for unattached DM logs.
        character_id: Option<CharacterId>,
        /// Log identifier.
        log_id: LogId,
        /// Whether the entry is DM-authored.
        is_dm_log: bool,
        /// Append timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a log is edited in place.
    LogUpdated {
        /// Owning character, `None` for unattached DM logs.
        character_id: Option<CharacterId>,
        /// Log identifier.
        log_id: LogId,
        /// Update timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a log is deleted.
    LogRemoved {
        /// Owning character, `None` for unattached DM logs.
        character_id: Option<CharacterId>,
        /// Log identifier.
        log_id: LogId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a DM log is applied to a character.
    DmLogAttached {
        /// Receiving character.
        character_id: CharacterId,
        /// Log identifier.
        log_id: LogId,
        /// The applied date recorded on the log.
        applied_date: DateTime<Utc>,
        /// Attach timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Returns the character the event concerns, if any.
    #[must_use]
    pub const fn character_id(&self) -> Option<CharacterId> {
        match self {
            Self::CharacterCreated { character_id, .. }
            | Self::CharacterUpdated { character_id, .. }
            | Self::CharacterRemoved { character_id, .. }
            | Self::DmLogAttached { character_id, .. } => Some(*character_id),
            Self::LogAppended { character_id, .. }
            | Self::LogUpdated { character_id, .. }
            | Self::LogRemoved { character_id, .. } => *character_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::CharacterCreated { .. } => "character_created",
            Self::CharacterUpdated { .. } => "character_updated",
            Self::CharacterRemoved { .. } => "character_removed",
            Self::LogAppended { .. } => "log_appended",
            Self::LogUpdated { .. } => "log_updated",
            Self::LogRemoved { .. } => "log_removed",
            Self::DmLogAttached { .. } => "dm_log_attached",
        }
    }

    /// Cache tags invalidated by this event.
    ///
    /// Character mutations touch `character-{id}` and the character
    /// list; DM-pool mutations touch the `dm-logs` collection tag.
    #[must_use]
    pub fn cache_tags(&self) -> Vec<String> {
        let mut tags = Vec::with_capacity(2);
        match self.character_id() {
            Some(id) => {
                tags.push(format!("character-{id}"));
                tags.push("characters".to_string());
            }
            None => tags.push("dm-logs".to_string()),
        }
        if matches!(self, Self::DmLogAttached { .. }) {
            // Attaching drains the DM pool as well.
            tags.push("dm-logs".to_string());
        }
        tags
    }
}
