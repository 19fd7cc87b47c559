//! Concurrent character storage with per-character fine-grained locking.
//!
//! [`Ledger`] stores every tracked character in a `HashMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. This
//! allows concurrent reads on the same character and concurrent writes
//! on different characters. Unattached DM logs live in a separate pool
//! until they are applied to a character.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::character::{Character, CharacterRow};
use super::log_entry::{DungeonMaster, LogEntry};
use super::{CharacterId, LogId};
use crate::error::LedgerError;

/// A character together with its ordered log history.
///
/// The `logs` vector is the ordering guarantee the aggregation engine
/// relies on: ascending by effective date, ties broken by insertion.
#[derive(Debug)]
pub struct CharacterEntry {
    /// Sheet metadata.
    pub character: Character,
    /// Log history, ascending by [`LogEntry::effective_date`].
    pub logs: Vec<LogEntry>,
}

impl CharacterEntry {
    /// Creates an entry with an empty history.
    #[must_use]
    pub const fn new(character: Character) -> Self {
        Self {
            character,
            logs: Vec::new(),
        }
    }

    /// Returns the log with the given id, if present.
    #[must_use]
    pub fn log(&self, log_id: LogId) -> Option<&LogEntry> {
        self.logs.iter().find(|l| l.id == log_id)
    }

    /// Inserts a log, keeping the history sorted by effective date.
    ///
    /// Among equal dates the new entry lands last, so re-saving a log on
    /// the same date does not shuffle its neighbors.
    pub fn insert_log(&mut self, log: LogEntry) {
        let at = self
            .logs
            .partition_point(|l| l.effective_date() <= log.effective_date());
        self.logs.insert(at, log);
    }

    /// Removes a log and cleans up the references it participated in.
    ///
    /// Loss marks held by the removed log disappear with it (the items
    /// it dropped become held again on the next read). References other
    /// logs hold against items the removed log granted are stripped so
    /// no dangling loss survives the delete.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`] if the history holds no log
    /// with the given ID.
    pub fn remove_log(&mut self, log_id: LogId) -> Result<LogEntry, LedgerError> {
        let at = self
            .logs
            .iter()
            .position(|l| l.id == log_id)
            .ok_or(LedgerError::LogNotFound(log_id.into()))?;
        let removed = self.logs.remove(at);

        let granted: Vec<_> = removed
            .magic_items_gained
            .iter()
            .chain(removed.story_awards_gained.iter())
            .map(|g| g.id)
            .collect();
        for log in &mut self.logs {
            log.magic_items_lost.retain(|id| !granted.contains(id));
            log.story_awards_lost.retain(|id| !granted.contains(id));
        }

        Ok(removed)
    }

    /// Replaces a log in place, re-sorting by effective date.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`] if the history holds no log
    /// with the given ID.
    pub fn replace_log(&mut self, log: LogEntry) -> Result<(), LedgerError> {
        let at = self
            .logs
            .iter()
            .position(|l| l.id == log.id)
            .ok_or(LedgerError::LogNotFound(log.id.into()))?;
        self.logs.remove(at);
        self.insert_log(log);
        Ok(())
    }
}

/// A dungeon master together with every log credited to them.
#[derive(Debug, Clone)]
pub struct DungeonMasterRecord {
    /// The dungeon master.
    pub dm: DungeonMaster,
    /// Logs credited to this DM, attached and unattached alike.
    pub logs: Vec<LogEntry>,
}

/// Central store for characters and unattached DM logs.
///
/// Uses a `RwLock<HashMap<...>>` for the outer maps and per-entry
/// `Arc<RwLock<CharacterEntry>>` for fine-grained per-character locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same character concurrently.
/// - Writes to different characters are concurrent.
/// - Writes to the same character are serialized.
#[derive(Debug)]
pub struct Ledger {
    characters: RwLock<HashMap<CharacterId, Arc<RwLock<CharacterEntry>>>>,
    dm_logs: RwLock<HashMap<LogId, LogEntry>>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            characters: RwLock::new(HashMap::new()),
            dm_logs: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new character.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] if a character with the
    /// same ID already exists (should never happen with UUID v4).
    pub async fn insert(&self, character: Character) -> Result<CharacterId, LedgerError> {
        let character_id = character.id;
        let mut map = self.characters.write().await;
        if map.contains_key(&character_id) {
            return Err(LedgerError::InvalidRequest(format!(
                "character {character_id} already exists"
            )));
        }
        map.insert(
            character_id,
            Arc::new(RwLock::new(CharacterEntry::new(character))),
        );
        Ok(character_id)
    }

    /// Returns a shared reference to the character entry behind its
    /// per-character lock.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CharacterNotFound`] if no character with
    /// the given ID exists.
    pub async fn get(
        &self,
        character_id: CharacterId,
    ) -> Result<Arc<RwLock<CharacterEntry>>, LedgerError> {
        let map = self.characters.read().await;
        map.get(&character_id)
            .cloned()
            .ok_or(LedgerError::CharacterNotFound(*character_id.as_uuid()))
    }

    /// Removes a character, returning its entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CharacterNotFound`] if no character with
    /// the given ID exists.
    pub async fn remove(&self, character_id: CharacterId) -> Result<CharacterEntry, LedgerError> {
        let mut map = self.characters.write().await;
        let arc = map
            .remove(&character_id)
            .ok_or(LedgerError::CharacterNotFound(*character_id.as_uuid()))?;
        let entry = Arc::try_unwrap(arc)
            .map_err(|_| {
                LedgerError::Internal("character entry still referenced elsewhere".to_string())
            })?
            .into_inner();
        Ok(entry)
    }

    /// Returns rows for all characters, optionally filtered by campaign.
    pub async fn list(&self, campaign_filter: Option<&str>) -> Vec<CharacterRow> {
        let map = self.characters.read().await;
        let mut rows = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            if let Some(filter) = campaign_filter
                && entry.character.campaign != filter
            {
                continue;
            }
            rows.push(CharacterRow::new(&entry.character, entry.logs.len()));
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    /// Returns the number of characters in the ledger.
    pub async fn len(&self) -> usize {
        self.characters.read().await.len()
    }

    /// Returns `true` if the ledger contains no characters.
    pub async fn is_empty(&self) -> bool {
        self.characters.read().await.is_empty()
    }

    // ── Unattached DM logs ──────────────────────────────────────────────

    /// Adds an unattached DM log to the pool.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] if a log with the same ID
    /// already exists.
    pub async fn insert_dm_log(&self, log: LogEntry) -> Result<LogId, LedgerError> {
        let log_id = log.id;
        let mut map = self.dm_logs.write().await;
        if map.contains_key(&log_id) {
            return Err(LedgerError::InvalidRequest(format!(
                "log {log_id} already exists"
            )));
        }
        map.insert(log_id, log);
        Ok(log_id)
    }

    /// Returns a copy of an unattached DM log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`] if the pool holds no log
    /// with the given ID.
    pub async fn dm_log(&self, log_id: LogId) -> Result<LogEntry, LedgerError> {
        let map = self.dm_logs.read().await;
        map.get(&log_id)
            .cloned()
            .ok_or(LedgerError::LogNotFound(*log_id.as_uuid()))
    }

    /// Replaces an unattached DM log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`] if the pool holds no log
    /// with the given ID.
    pub async fn replace_dm_log(&self, log: LogEntry) -> Result<(), LedgerError> {
        let mut map = self.dm_logs.write().await;
        if !map.contains_key(&log.id) {
            return Err(LedgerError::LogNotFound(*log.id.as_uuid()));
        }
        map.insert(log.id, log);
        Ok(())
    }

    /// Removes an unattached DM log from the pool, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`] if the pool holds no log
    /// with the given ID.
    pub async fn take_dm_log(&self, log_id: LogId) -> Result<LogEntry, LedgerError> {
        let mut map = self.dm_logs.write().await;
        map.remove(&log_id)
            .ok_or(LedgerError::LogNotFound(*log_id.as_uuid()))
    }

    /// Returns unattached DM logs, optionally filtered by DM name.
    pub async fn list_dm_logs(&self, dm_filter: Option<&str>) -> Vec<LogEntry> {
        let map = self.dm_logs.read().await;
        let mut logs: Vec<LogEntry> = map
            .values()
            .filter(|log| {
                dm_filter.is_none_or(|name| {
                    log.dm.as_ref().is_some_and(|dm| dm.name == name)
                })
            })
            .cloned()
            .collect();
        logs.sort_by_key(LogEntry::effective_date);
        logs
    }

    // ── Dungeon master projection ───────────────────────────────────────

    /// Groups every log in the ledger by its credited dungeon master.
    ///
    /// Covers attached character logs and the unattached DM-log pool.
    /// Records are sorted by DM name; each record's logs by effective
    /// date.
    pub async fn dungeon_masters(&self) -> Vec<DungeonMasterRecord> {
        let mut by_dm: HashMap<super::DungeonMasterId, DungeonMasterRecord> = HashMap::new();

        let characters = self.characters.read().await;
        for entry_lock in characters.values() {
            let entry = entry_lock.read().await;
            for log in &entry.logs {
                if let Some(dm) = &log.dm {
                    by_dm
                        .entry(dm.id)
                        .or_insert_with(|| DungeonMasterRecord {
                            dm: dm.clone(),
                            logs: Vec::new(),
                        })
                        .logs
                        .push(log.clone());
                }
            }
        }
        drop(characters);

        let pool = self.dm_logs.read().await;
        for log in pool.values() {
            if let Some(dm) = &log.dm {
                by_dm
                    .entry(dm.id)
                    .or_insert_with(|| DungeonMasterRecord {
                        dm: dm.clone(),
                        logs: Vec::new(),
                    })
                    .logs
                    .push(log.clone());
            }
        }
        drop(pool);

        let mut records: Vec<DungeonMasterRecord> = by_dm.into_values().collect();
        for record in &mut records {
            record.logs.sort_by_key(LogEntry::effective_date);
        }
        records.sort_by(|a, b| a.dm.name.cmp(&b.dm.name));
        records
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
