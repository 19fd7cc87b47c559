//! Log entries: the immutable records a character's history is made of.
//!
//! A [`LogEntry`] captures one play session or non-game transaction. DM
//! logs start unattached (`character_id` is `None`) and may later be
//! applied to a character; [`LogEntry::effective_date`] resolves the
//! date the entry takes effect in that character's timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CharacterId, DungeonMasterId, ItemId, LogId};

/// Classification of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// A played game session.
    Game,
    /// A non-game transaction (trading post, downtime activity, etc.).
    NonGame,
}

/// The dungeon master credited on a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DungeonMaster {
    /// Dungeon master identifier.
    pub id: DungeonMasterId,
    /// Display name.
    pub name: String,
    /// Optional DCI organized-play number (up to 10 digits).
    pub dci: Option<String>,
}

/// A magic item or story award granted by a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemGrant {
    /// Grant identifier, referenced by later loss entries.
    pub id: ItemId,
    /// Item or award name as written on the log sheet.
    pub name: String,
    /// Free-text description (may be empty).
    #[serde(default)]
    pub description: String,
}

/// One session or transaction applied (or applicable) to a character.
///
/// Entries are immutable once written; edits replace the whole record.
/// All numeric fields are deltas against the character's running totals,
/// not absolute values.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
    /// Unique log identifier.
    pub id: LogId,

    /// Session or transaction title.
    pub name: String,

    /// Session date.
    pub date: DateTime<Utc>,

    /// For DM logs: the date the entry was retroactively applied to a
    /// character. `None` until attached.
    pub applied_date: Option<DateTime<Utc>>,

    /// Game session or non-game transaction.
    pub kind: LogKind,

    /// Whether this entry was authored from the DM's side of the table.
    pub is_dm_log: bool,

    /// Owning character, `None` for unattached DM logs.
    pub character_id: Option<CharacterId>,

    /// Credited dungeon master, if any.
    pub dm: Option<DungeonMaster>,

    /// Experience points gained.
    pub experience: i64,

    /// Advancement checkpoints gained (season 8 ruleset, non-negative).
    pub acp: u32,

    /// Treasure checkpoints delta (season 8 ruleset).
    pub tcp: i32,

    /// Character levels gained (non-negative delta).
    pub level: u32,

    /// Gold delta, signed. Spending is negative.
    pub gold: f64,

    /// Downtime days delta, signed.
    pub dtd: i32,

    /// Free-text session notes.
    #[serde(default)]
    pub description: String,

    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Magic items granted by this entry.
    #[serde(default)]
    pub magic_items_gained: Vec<ItemGrant>,

    /// References to previously granted magic items dropped here.
    #[serde(default)]
    pub magic_items_lost: Vec<ItemId>,

    /// Story awards granted by this entry.
    #[serde(default)]
    pub story_awards_gained: Vec<ItemGrant>,

    /// References to previously granted story awards dropped here.
    #[serde(default)]
    pub story_awards_lost: Vec<ItemId>,
}

impl LogEntry {
    /// The date this entry takes effect in a character's timeline.
    ///
    /// DM logs are ordered by the date they were applied to the
    /// character rather than the date the session was played.
    #[must_use]
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.applied_date.unwrap_or(self.date)
    }

    /// Grants of the given kind carried by this entry.
    #[must_use]
    pub fn grants(&self, kind: ItemKind) -> &[ItemGrant] {
        match kind {
            ItemKind::MagicItem => &self.magic_items_gained,
            ItemKind::StoryAward => &self.story_awards_gained,
        }
    }

    /// Loss references of the given kind carried by this entry.
    #[must_use]
    pub fn losses(&self, kind: ItemKind) -> &[ItemId] {
        match kind {
            ItemKind::MagicItem => &self.magic_items_lost,
            ItemKind::StoryAward => &self.story_awards_lost,
        }
    }
}

/// The two categories of narrative rewards a log may grant.
///
/// Structurally identical everywhere; kept distinct so a story award can
/// never be dropped as a magic item or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Magic item.
    MagicItem,
    /// Story award.
    StoryAward,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blank_entry() -> LogEntry {
        LogEntry {
            id: LogId::new(),
            name: "The Hidden Shrine".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).single().unwrap_or_default(),
            applied_date: None,
            kind: LogKind::Game,
            is_dm_log: false,
            character_id: Some(CharacterId::new()),
            dm: None,
            experience: 0,
            acp: 0,
            tcp: 0,
            level: 0,
            gold: 0.0,
            dtd: 0,
            description: String::new(),
            created_at: Utc::now(),
            magic_items_gained: vec![],
            magic_items_lost: vec![],
            story_awards_gained: vec![],
            story_awards_lost: vec![],
        }
    }

    #[test]
    fn effective_date_defaults_to_session_date() {
        let entry = blank_entry();
        assert_eq!(entry.effective_date(), entry.date);
    }

    #[test]
    fn effective_date_prefers_applied_date() {
        let mut entry = blank_entry();
        let applied = Utc.with_ymd_and_hms(2024, 4, 2, 12, 0, 0).single();
        entry.applied_date = applied;
        assert_eq!(Some(entry.effective_date()), applied);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&LogKind::NonGame).unwrap_or_default();
        assert_eq!(json, "\"nongame\"");
    }

    #[test]
    fn grants_and_losses_select_by_kind() {
        let mut entry = blank_entry();
        entry.magic_items_gained.push(ItemGrant {
            id: ItemId::new(),
            name: "Bag of Holding".to_string(),
            description: String::new(),
        });
        entry.story_awards_lost.push(ItemId::new());

        assert_eq!(entry.grants(ItemKind::MagicItem).len(), 1);
        assert!(entry.grants(ItemKind::StoryAward).is_empty());
        assert!(entry.losses(ItemKind::MagicItem).is_empty());
        assert_eq!(entry.losses(ItemKind::StoryAward).len(), 1);
    }
}
