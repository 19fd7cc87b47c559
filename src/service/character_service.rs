//! Character service: orchestrates ledger operations and emits events.
//!
//! Every mutation follows the pattern: validate → acquire lock → mutate
//! ledger → invalidate cache tags → publish event → return result. All
//! league policy (level cap, loss-reference integrity) is enforced here,
//! on the write path; the aggregation engine itself never validates.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::summary_cache::SummaryCache;
use crate::domain::{
    Character, CharacterId, CharacterRow, DungeonMaster, DungeonMasterId, DungeonMasterRecord,
    EventBus, InventoryFilter, ItemGrant, ItemId, ItemKind, Ledger, LedgerEvent, LogEntry, LogId,
    LogKind, Possession, Summary, resolve_inventory, summarize,
};
use crate::error::LedgerError;

/// Adventurers League level cap. The reducer never clamps; the write
/// path refuses level deltas that would cross this.
const LEVEL_CAP: u32 = 20;

/// Maximum digits in a DCI organized-play number.
const DCI_MAX_DIGITS: usize = 10;

/// Fields accepted when creating or editing a character.
#[derive(Debug, Clone)]
pub struct CharacterDraft {
    /// Character name (required).
    pub name: String,
    /// Campaign name (required).
    pub campaign: String,
    /// Race (may be empty).
    pub race: String,
    /// Class (may be empty).
    pub class: String,
    /// Character sheet link (may be empty).
    pub character_sheet_url: String,
    /// Portrait link (may be empty).
    pub image_url: String,
}

/// A granted item as submitted by a client.
///
/// Carrying the id across edits keeps loss references on later logs
/// valid; omitted ids mean a brand-new grant.
#[derive(Debug, Clone)]
pub struct GrantDraft {
    /// Existing grant id, `None` for new grants.
    pub id: Option<ItemId>,
    /// Item or award name (required).
    pub name: String,
    /// Free-text description.
    pub description: String,
}

/// The credited DM as submitted by a client.
#[derive(Debug, Clone)]
pub struct DmDraft {
    /// DM display name (required).
    pub name: String,
    /// Optional DCI number, up to 10 digits.
    pub dci: Option<String>,
}

/// Fields accepted when creating or editing a log entry.
#[derive(Debug, Clone)]
pub struct LogDraft {
    /// Session or transaction title (required).
    pub name: String,
    /// Session date.
    pub date: DateTime<Utc>,
    /// Game session or non-game transaction.
    pub kind: LogKind,
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
    /// Credited DM, if any.
    pub dm: Option<DmDraft>,
    /// Magic items granted.
    pub magic_items_gained: Vec<GrantDraft>,
    /// Magic items dropped, by grant id.
    pub magic_items_lost: Vec<ItemId>,
    /// Story awards granted.
    pub story_awards_gained: Vec<GrantDraft>,
    /// Story awards dropped, by grant id.
    pub story_awards_lost: Vec<ItemId>,
}

/// A character read: metadata, ordered history, derived summary, and
/// current inventories.
#[derive(Debug, Clone)]
pub struct CharacterView {
    /// Sheet metadata.
    pub character: Character,
    /// Log history ascending by effective date.
    pub logs: Vec<LogEntry>,
    /// Derived totals (possibly served from the summary cache).
    pub summary: Arc<Summary>,
    /// Magic items currently held, in grant order.
    pub magic_items: Vec<Possession>,
    /// Story awards currently held, in grant order.
    pub story_awards: Vec<Possession>,
}

/// Orchestration layer for all character and log operations.
///
/// Stateless coordinator: owns references to [`Ledger`] for state, the
/// [`SummaryCache`] for memoized reads, and [`EventBus`] for event
/// emission.
#[derive(Debug, Clone)]
pub struct CharacterService {
    ledger: Arc<Ledger>,
    cache: Arc<SummaryCache>,
    event_bus: EventBus,
}

impl CharacterService {
    /// Creates a new `CharacterService`.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, cache: Arc<SummaryCache>, event_bus: EventBus) -> Self {
        Self {
            ledger,
            cache,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`Ledger`].
    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Invalidates the cache tags touched by `event`, then broadcasts it.
    async fn emit(&self, event: LedgerEvent) {
        self.cache.invalidate_tags(&event.cache_tags()).await;
        let _ = self.event_bus.publish(event);
    }

    // ── Characters ──────────────────────────────────────────────────────

    /// Creates a new character.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] when the name or campaign
    /// is blank.
    pub async fn create_character(&self, draft: CharacterDraft) -> Result<Character, LedgerError> {
        if draft.name.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(
                "character name is required".to_string(),
            ));
        }
        if draft.campaign.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(
                "campaign is required".to_string(),
            ));
        }

        let character = Character {
            id: CharacterId::new(),
            name: draft.name,
            campaign: draft.campaign,
            race: draft.race,
            class: draft.class,
            character_sheet_url: draft.character_sheet_url,
            image_url: draft.image_url,
            created_at: Utc::now(),
        };
        let snapshot = character.clone();
        let character_id = self.ledger.insert(character).await?;

        self.emit(LedgerEvent::CharacterCreated {
            character_id,
            name: snapshot.name.clone(),
            timestamp: Utc::now(),
        })
        .await;

        tracing::info!(%character_id, name = %snapshot.name, "character created");
        Ok(snapshot)
    }

    /// Reads a character with its history, summary, and inventories.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CharacterNotFound`] if the character does
    /// not exist.
    pub async fn get_character(
        &self,
        character_id: CharacterId,
    ) -> Result<CharacterView, LedgerError> {
        let entry_lock = self.ledger.get(character_id).await?;
        let entry = entry_lock.read().await;

        let summary = self.summary_for(character_id, &entry.logs).await;
        let held = InventoryFilter::default();
        let magic_items: Vec<Possession> =
            resolve_inventory(&entry.logs, ItemKind::MagicItem, &held)
                .into_iter()
                .filter(Possession::is_held)
                .collect();
        let story_awards: Vec<Possession> =
            resolve_inventory(&entry.logs, ItemKind::StoryAward, &held)
                .into_iter()
                .filter(Possession::is_held)
                .collect();

        Ok(CharacterView {
            character: entry.character.clone(),
            logs: entry.logs.clone(),
            summary,
            magic_items,
            story_awards,
        })
    }

    /// Resolves a character's inventory of the given kind with the full
    /// filter surface of the engine exposed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CharacterNotFound`] if the character does
    /// not exist.
    pub async fn character_inventory(
        &self,
        character_id: CharacterId,
        kind: ItemKind,
        filter: InventoryFilter,
    ) -> Result<Vec<Possession>, LedgerError> {
        let entry_lock = self.ledger.get(character_id).await?;
        let entry = entry_lock.read().await;
        Ok(resolve_inventory(&entry.logs, kind, &filter))
    }

    /// Returns rows for all characters, optionally filtered by campaign.
    pub async fn list_characters(&self, campaign_filter: Option<&str>) -> Vec<CharacterRow> {
        self.ledger.list(campaign_filter).await
    }

    /// Edits character sheet metadata.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CharacterNotFound`] if the character does
    /// not exist, or [`LedgerError::InvalidRequest`] on blank fields.
    pub async fn update_character(
        &self,
        character_id: CharacterId,
        draft: CharacterDraft,
    ) -> Result<Character, LedgerError> {
        if draft.name.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(
                "character name is required".to_string(),
            ));
        }
        if draft.campaign.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(
                "campaign is required".to_string(),
            ));
        }

        let entry_lock = self.ledger.get(character_id).await?;
        let mut entry = entry_lock.write().await;
        entry.character.name = draft.name;
        entry.character.campaign = draft.campaign;
        entry.character.race = draft.race;
        entry.character.class = draft.class;
        entry.character.character_sheet_url = draft.character_sheet_url;
        entry.character.image_url = draft.image_url;
        let snapshot = entry.character.clone();
        drop(entry);

        self.emit(LedgerEvent::CharacterUpdated {
            character_id,
            timestamp: Utc::now(),
        })
        .await;

        Ok(snapshot)
    }

    /// Removes a character and its entire history.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CharacterNotFound`] if the character does
    /// not exist.
    pub async fn delete_character(&self, character_id: CharacterId) -> Result<(), LedgerError> {
        let _entry = self.ledger.remove(character_id).await?;

        self.emit(LedgerEvent::CharacterRemoved {
            character_id,
            timestamp: Utc::now(),
        })
        .await;

        tracing::info!(%character_id, "character removed");
        Ok(())
    }

    // ── Character logs ──────────────────────────────────────────────────

    /// Appends a log to a character's history.
    ///
    /// # Errors
    ///
    /// Returns a validation or policy error when the draft is blank,
    /// the level delta crosses the cap, or a loss reference does not
    /// resolve to a held item.
    pub async fn append_log(
        &self,
        character_id: CharacterId,
        draft: LogDraft,
    ) -> Result<LogEntry, LedgerError> {
        validate_log_draft(&draft)?;
        let dm = self.resolve_dm(draft.dm.as_ref()).await;

        let entry_lock = self.ledger.get(character_id).await?;
        let mut entry = entry_lock.write().await;

        let summary = summarize(&entry.logs);
        check_level_cap(summary.total_level, 0, draft.level)?;
        check_loss_references(&entry.logs, &draft, None)?;

        let log = build_log(draft, Some(character_id), dm, false, None);
        let log_id = log.id;
        let snapshot = log.clone();
        entry.insert_log(log);
        drop(entry);

        self.emit(LedgerEvent::LogAppended {
            character_id: Some(character_id),
            log_id,
            is_dm_log: false,
            timestamp: Utc::now(),
        })
        .await;

        tracing::info!(%character_id, %log_id, "log appended");
        Ok(snapshot)
    }

    /// Edits a log in place, preserving its identity, DM-log flag, and
    /// applied date.
    ///
    /// # Errors
    ///
    /// Returns a validation or policy error as for
    /// [`CharacterService::append_log`], or
    /// [`LedgerError::LogNotFound`].
    pub async fn update_log(
        &self,
        character_id: CharacterId,
        log_id: LogId,
        draft: LogDraft,
    ) -> Result<LogEntry, LedgerError> {
        validate_log_draft(&draft)?;
        let dm = self.resolve_dm(draft.dm.as_ref()).await;

        let entry_lock = self.ledger.get(character_id).await?;
        let mut entry = entry_lock.write().await;

        let existing = entry
            .log(log_id)
            .cloned()
            .ok_or(LedgerError::LogNotFound(*log_id.as_uuid()))?;

        let summary = summarize(&entry.logs);
        check_level_cap(summary.total_level, existing.level, draft.level)?;
        check_loss_references(&entry.logs, &draft, Some(log_id))?;

        let mut log = build_log(
            draft,
            Some(character_id),
            dm,
            existing.is_dm_log,
            existing.applied_date,
        );
        log.id = existing.id;
        log.created_at = existing.created_at;
        let snapshot = log.clone();
        entry.replace_log(log)?;
        drop(entry);

        self.emit(LedgerEvent::LogUpdated {
            character_id: Some(character_id),
            log_id,
            timestamp: Utc::now(),
        })
        .await;

        Ok(snapshot)
    }

    /// Deletes a log from a character's history.
    ///
    /// The items the log dropped become held again; loss references
    /// other logs held against its grants are stripped.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CharacterNotFound`] or
    /// [`LedgerError::LogNotFound`].
    pub async fn delete_log(
        &self,
        character_id: CharacterId,
        log_id: LogId,
    ) -> Result<(), LedgerError> {
        let entry_lock = self.ledger.get(character_id).await?;
        let mut entry = entry_lock.write().await;
        let _removed = entry.remove_log(log_id)?;
        drop(entry);

        self.emit(LedgerEvent::LogRemoved {
            character_id: Some(character_id),
            log_id,
            timestamp: Utc::now(),
        })
        .await;

        tracing::info!(%character_id, %log_id, "log removed");
        Ok(())
    }

    // ── DM logs ─────────────────────────────────────────────────────────

    /// Creates an unattached DM log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] when the draft is blank
    /// or tries to drop items (an unattached log has no history to
    /// drop from).
    pub async fn create_dm_log(&self, draft: LogDraft) -> Result<LogEntry, LedgerError> {
        validate_log_draft(&draft)?;
        if !draft.magic_items_lost.is_empty() || !draft.story_awards_lost.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "an unattached DM log cannot drop items".to_string(),
            ));
        }
        let dm = self.resolve_dm(draft.dm.as_ref()).await;

        let log = build_log(draft, None, dm, true, None);
        let snapshot = log.clone();
        let log_id = self.ledger.insert_dm_log(log).await?;

        self.emit(LedgerEvent::LogAppended {
            character_id: None,
            log_id,
            is_dm_log: true,
            timestamp: Utc::now(),
        })
        .await;

        tracing::info!(%log_id, "dm log created");
        Ok(snapshot)
    }

    /// Reads an unattached DM log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`] if the pool holds no such
    /// log.
    pub async fn get_dm_log(&self, log_id: LogId) -> Result<LogEntry, LedgerError> {
        self.ledger.dm_log(log_id).await
    }

    /// Lists unattached DM logs, optionally filtered by DM name.
    pub async fn list_dm_logs(&self, dm_filter: Option<&str>) -> Vec<LogEntry> {
        self.ledger.list_dm_logs(dm_filter).await
    }

    /// Edits an unattached DM log.
    ///
    /// # Errors
    ///
    /// As for [`CharacterService::create_dm_log`], plus
    /// [`LedgerError::LogNotFound`].
    pub async fn update_dm_log(
        &self,
        log_id: LogId,
        draft: LogDraft,
    ) -> Result<LogEntry, LedgerError> {
        validate_log_draft(&draft)?;
        if !draft.magic_items_lost.is_empty() || !draft.story_awards_lost.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "an unattached DM log cannot drop items".to_string(),
            ));
        }
        let dm = self.resolve_dm(draft.dm.as_ref()).await;

        let existing = self.ledger.dm_log(log_id).await?;
        let mut log = build_log(draft, None, dm, true, None);
        log.id = existing.id;
        log.created_at = existing.created_at;
        let snapshot = log.clone();
        self.ledger.replace_dm_log(log).await?;

        self.emit(LedgerEvent::LogUpdated {
            character_id: None,
            log_id,
            timestamp: Utc::now(),
        })
        .await;

        Ok(snapshot)
    }

    /// Deletes an unattached DM log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`] if the pool holds no such
    /// log.
    pub async fn delete_dm_log(&self, log_id: LogId) -> Result<(), LedgerError> {
        let _log = self.ledger.take_dm_log(log_id).await?;

        self.emit(LedgerEvent::LogRemoved {
            character_id: None,
            log_id,
            timestamp: Utc::now(),
        })
        .await;

        tracing::info!(%log_id, "dm log removed");
        Ok(())
    }

    /// Applies an unattached DM log to a character as of `applied_date`.
    ///
    /// The log leaves the pool and joins the character's history,
    /// ordered by the applied date rather than the session date.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LogNotFound`],
    /// [`LedgerError::CharacterNotFound`],
    /// [`LedgerError::LogAlreadyAttached`] when the log already names a
    /// character, or [`LedgerError::LevelCapExceeded`].
    pub async fn attach_dm_log(
        &self,
        log_id: LogId,
        character_id: CharacterId,
        applied_date: DateTime<Utc>,
    ) -> Result<LogEntry, LedgerError> {
        let mut log = self.ledger.take_dm_log(log_id).await?;
        if log.character_id.is_some() {
            // Put it back untouched before reporting the conflict.
            let _ = self.ledger.insert_dm_log(log).await;
            return Err(LedgerError::LogAlreadyAttached(*log_id.as_uuid()));
        }

        let entry_lock = match self.ledger.get(character_id).await {
            Ok(lock) => lock,
            Err(err) => {
                let _ = self.ledger.insert_dm_log(log).await;
                return Err(err);
            }
        };
        let mut entry = entry_lock.write().await;

        let summary = summarize(&entry.logs);
        if let Err(err) = check_level_cap(summary.total_level, 0, log.level) {
            drop(entry);
            let _ = self.ledger.insert_dm_log(log).await;
            return Err(err);
        }

        log.character_id = Some(character_id);
        log.applied_date = Some(applied_date);
        let snapshot = log.clone();
        entry.insert_log(log);
        drop(entry);

        self.emit(LedgerEvent::DmLogAttached {
            character_id,
            log_id,
            applied_date,
            timestamp: Utc::now(),
        })
        .await;

        tracing::info!(%character_id, %log_id, "dm log attached");
        Ok(snapshot)
    }

    // ── Dungeon masters ─────────────────────────────────────────────────

    /// Groups every log in the ledger by its credited DM.
    pub async fn dungeon_masters(&self) -> Vec<DungeonMasterRecord> {
        self.ledger.dungeon_masters().await
    }

    /// Returns one DM's record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DungeonMasterNotFound`] if no log credits
    /// the given DM.
    pub async fn dungeon_master(
        &self,
        dm_id: DungeonMasterId,
    ) -> Result<DungeonMasterRecord, LedgerError> {
        self.ledger
            .dungeon_masters()
            .await
            .into_iter()
            .find(|record| record.dm.id == dm_id)
            .ok_or(LedgerError::DungeonMasterNotFound(*dm_id.as_uuid()))
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Returns the memoized summary for a character, computing and
    /// storing it on a miss.
    async fn summary_for(&self, character_id: CharacterId, logs: &[LogEntry]) -> Arc<Summary> {
        let key = format!("character-{character_id}");
        if let Some(hit) = self.cache.get(&key).await {
            return hit;
        }
        let computed = Arc::new(summarize(logs));
        let tags = vec![key.clone(), "characters".to_string()];
        self.cache.put(key, &tags, Arc::clone(&computed)).await;
        computed
    }

    /// Resolves a DM draft against the DMs already on record, reusing
    /// the existing identity when the name matches.
    async fn resolve_dm(&self, draft: Option<&DmDraft>) -> Option<DungeonMaster> {
        let draft = draft?;
        let name = draft.name.trim();
        if name.is_empty() {
            return None;
        }
        let existing = self
            .ledger
            .dungeon_masters()
            .await
            .into_iter()
            .find(|record| record.dm.name == name);
        match existing {
            Some(record) => Some(DungeonMaster {
                dci: draft.dci.clone().or(record.dm.dci),
                ..record.dm
            }),
            None => Some(DungeonMaster {
                id: DungeonMasterId::new(),
                name: name.to_string(),
                dci: draft.dci.clone(),
            }),
        }
    }
}

/// Builds a [`LogEntry`] from a validated draft.
fn build_log(
    draft: LogDraft,
    character_id: Option<CharacterId>,
    dm: Option<DungeonMaster>,
    is_dm_log: bool,
    applied_date: Option<DateTime<Utc>>,
) -> LogEntry {
    let materialize = |grants: Vec<GrantDraft>| -> Vec<ItemGrant> {
        grants
            .into_iter()
            .map(|g| ItemGrant {
                id: g.id.unwrap_or_default(),
                name: g.name,
                description: g.description,
            })
            .collect()
    };

    LogEntry {
        id: LogId::new(),
        name: draft.name,
        date: draft.date,
        applied_date,
        kind: draft.kind,
        is_dm_log,
        character_id,
        dm,
        experience: draft.experience,
        acp: draft.acp,
        tcp: draft.tcp,
        level: draft.level,
        gold: draft.gold,
        dtd: draft.dtd,
        description: draft.description,
        created_at: Utc::now(),
        magic_items_gained: materialize(draft.magic_items_gained),
        magic_items_lost: draft.magic_items_lost,
        story_awards_gained: materialize(draft.story_awards_gained),
        story_awards_lost: draft.story_awards_lost,
    }
}

/// Field-level validation shared by every log write.
fn validate_log_draft(draft: &LogDraft) -> Result<(), LedgerError> {
    if draft.name.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "log name is required".to_string(),
        ));
    }
    for grant in draft
        .magic_items_gained
        .iter()
        .chain(draft.story_awards_gained.iter())
    {
        if grant.name.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(
                "item name is required".to_string(),
            ));
        }
    }
    if let Some(dm) = &draft.dm
        && let Some(dci) = &dm.dci
        && (dci.len() > DCI_MAX_DIGITS || !dci.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(LedgerError::InvalidRequest(
            "DCI must be up to 10 digits".to_string(),
        ));
    }
    Ok(())
}

/// Refuses level deltas that would cross the league cap.
///
/// `replaced_levels` is the delta the edited log previously contributed,
/// zero for appends.
fn check_level_cap(
    total_level: u32,
    replaced_levels: u32,
    requested: u32,
) -> Result<(), LedgerError> {
    if requested > 0 && total_level - replaced_levels + requested > LEVEL_CAP {
        return Err(LedgerError::LevelCapExceeded {
            cap: LEVEL_CAP,
            requested,
        });
    }
    Ok(())
}

/// Verifies every loss reference resolves to an item still droppable as
/// of the written log.
///
/// Reuses the inventory resolver's `exclude_dropped` mode: the valid
/// drop set for an edit of log `L` is the inventory as of `L`; for an
/// append it is the inventory at the end of the timeline.
fn check_loss_references(
    logs: &[LogEntry],
    draft: &LogDraft,
    editing: Option<LogId>,
) -> Result<(), LedgerError> {
    let filter = InventoryFilter {
        exclude_dropped: true,
        last_log_id: editing,
    };
    for (kind, losses) in [
        (ItemKind::MagicItem, &draft.magic_items_lost),
        (ItemKind::StoryAward, &draft.story_awards_lost),
    ] {
        if losses.is_empty() {
            continue;
        }
        let droppable = resolve_inventory(logs, kind, &filter);
        for lost in losses {
            if !droppable.iter().any(|p| p.id == *lost) {
                return Err(LedgerError::UnknownLossReference(*lost.as_uuid()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_service() -> CharacterService {
        let ledger = Arc::new(Ledger::new());
        let cache = Arc::new(SummaryCache::new(true));
        let event_bus = EventBus::new(1000);
        CharacterService::new(ledger, cache, event_bus)
    }

    fn character_draft(name: &str) -> CharacterDraft {
        CharacterDraft {
            name: name.to_string(),
            campaign: "Forgotten Realms".to_string(),
            race: "Human".to_string(),
            class: "Fighter".to_string(),
            character_sheet_url: String::new(),
            image_url: String::new(),
        }
    }

    fn log_draft(day: u32, level: u32, gold: f64) -> LogDraft {
        LogDraft {
            name: format!("session {day}"),
            date: Utc
                .with_ymd_and_hms(2024, 6, day, 19, 0, 0)
                .single()
                .unwrap_or_default(),
            kind: LogKind::Game,
            experience: 0,
            acp: 0,
            tcp: 0,
            level,
            gold,
            dtd: 0,
            description: String::new(),
            dm: None,
            magic_items_gained: vec![],
            magic_items_lost: vec![],
            story_awards_gained: vec![],
            story_awards_lost: vec![],
        }
    }

    async fn seeded_character(service: &CharacterService) -> CharacterId {
        let Ok(character) = service.create_character(character_draft("Tarly")).await else {
            panic!("character creation failed");
        };
        character.id
    }

    #[tokio::test]
    async fn create_character_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let result = service.create_character(character_draft("Tarly")).await;
        assert!(result.is_ok());

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "character_created");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let service = make_service();
        let result = service.create_character(character_draft("   ")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn append_log_feeds_the_summary() {
        let service = make_service();
        let id = seeded_character(&service).await;

        let result = service.append_log(id, log_draft(1, 3, 50.0)).await;
        assert!(result.is_ok());

        let Ok(view) = service.get_character(id).await else {
            panic!("character not found");
        };
        assert_eq!(view.summary.total_level, 4);
        assert_eq!(view.summary.tier, 1);
        assert_eq!(view.summary.total_gold, 50.0);
        assert_eq!(view.logs.len(), 1);
    }

    #[tokio::test]
    async fn summary_is_cached_until_the_next_write() {
        let service = make_service();
        let id = seeded_character(&service).await;
        let _ = service.append_log(id, log_draft(1, 2, 0.0)).await;

        let Ok(first) = service.get_character(id).await else {
            panic!("character not found");
        };
        let Ok(second) = service.get_character(id).await else {
            panic!("character not found");
        };
        // Same Arc: the second read was served from the cache.
        assert!(Arc::ptr_eq(&first.summary, &second.summary));

        let _ = service.append_log(id, log_draft(2, 1, 0.0)).await;
        let Ok(third) = service.get_character(id).await else {
            panic!("character not found");
        };
        assert_eq!(third.summary.total_level, 4);
    }

    #[tokio::test]
    async fn level_cap_is_enforced_on_the_write_path() {
        let service = make_service();
        let id = seeded_character(&service).await;
        let _ = service.append_log(id, log_draft(1, 19, 0.0)).await;

        let capped = service.append_log(id, log_draft(2, 1, 0.0)).await;
        assert!(matches!(
            capped,
            Err(LedgerError::LevelCapExceeded { .. })
        ));

        // A zero-level log is still fine at the cap.
        let flat = service.append_log(id, log_draft(3, 0, 10.0)).await;
        assert!(flat.is_ok());
    }

    #[tokio::test]
    async fn loss_reference_must_resolve_to_a_held_item() {
        let service = make_service();
        let id = seeded_character(&service).await;

        let mut granting = log_draft(1, 0, 0.0);
        granting.magic_items_gained.push(GrantDraft {
            id: None,
            name: "Potion of Healing".to_string(),
            description: String::new(),
        });
        let Ok(granted) = service.append_log(id, granting).await else {
            panic!("append failed");
        };
        let Some(item_id) = granted.magic_items_gained.first().map(|g| g.id) else {
            panic!("grant missing");
        };

        let mut dropping = log_draft(2, 0, 0.0);
        dropping.magic_items_lost.push(item_id);
        assert!(service.append_log(id, dropping).await.is_ok());

        // Dropping it a second time no longer resolves.
        let mut double_drop = log_draft(3, 0, 0.0);
        double_drop.magic_items_lost.push(item_id);
        assert!(matches!(
            service.append_log(id, double_drop).await,
            Err(LedgerError::UnknownLossReference(_))
        ));

        // A fabricated reference never resolves.
        let mut dangling = log_draft(4, 0, 0.0);
        dangling.magic_items_lost.push(ItemId::new());
        assert!(service.append_log(id, dangling).await.is_err());
    }

    #[tokio::test]
    async fn editing_a_drop_log_keeps_its_own_drop_valid() {
        let service = make_service();
        let id = seeded_character(&service).await;

        let mut granting = log_draft(1, 0, 0.0);
        granting.magic_items_gained.push(GrantDraft {
            id: None,
            name: "Potion of Healing".to_string(),
            description: String::new(),
        });
        let Ok(granted) = service.append_log(id, granting).await else {
            panic!("append failed");
        };
        let Some(item_id) = granted.magic_items_gained.first().map(|g| g.id) else {
            panic!("grant missing");
        };

        let mut dropping = log_draft(2, 0, 0.0);
        dropping.magic_items_lost.push(item_id);
        let Ok(drop_log) = service.append_log(id, dropping).await else {
            panic!("append failed");
        };

        // Re-saving the drop log with the same loss reference works.
        let mut edit = log_draft(2, 0, 5.0);
        edit.magic_items_lost.push(item_id);
        let result = service.update_log(id, drop_log.id, edit).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn deleting_a_log_releases_its_drops() {
        let service = make_service();
        let id = seeded_character(&service).await;

        let mut granting = log_draft(1, 0, 0.0);
        granting.magic_items_gained.push(GrantDraft {
            id: None,
            name: "Potion of Healing".to_string(),
            description: String::new(),
        });
        let Ok(granted) = service.append_log(id, granting).await else {
            panic!("append failed");
        };
        let Some(item_id) = granted.magic_items_gained.first().map(|g| g.id) else {
            panic!("grant missing");
        };

        let mut dropping = log_draft(2, 0, 0.0);
        dropping.magic_items_lost.push(item_id);
        let Ok(drop_log) = service.append_log(id, dropping).await else {
            panic!("append failed");
        };

        let Ok(view) = service.get_character(id).await else {
            panic!("character not found");
        };
        assert!(view.magic_items.is_empty());

        assert!(service.delete_log(id, drop_log.id).await.is_ok());
        let Ok(view) = service.get_character(id).await else {
            panic!("character not found");
        };
        assert_eq!(view.magic_items.len(), 1);
    }

    #[tokio::test]
    async fn attach_orders_by_applied_date() {
        let service = make_service();
        let id = seeded_character(&service).await;
        let _ = service.append_log(id, log_draft(10, 1, 0.0)).await;

        let mut dm_draft = log_draft(1, 1, 0.0);
        dm_draft.dm = Some(DmDraft {
            name: "Morgan".to_string(),
            dci: None,
        });
        let Ok(dm_log) = service.create_dm_log(dm_draft).await else {
            panic!("dm log creation failed");
        };

        let applied = Utc
            .with_ymd_and_hms(2024, 6, 20, 12, 0, 0)
            .single()
            .unwrap_or_default();
        let attached = service.attach_dm_log(dm_log.id, id, applied).await;
        assert!(attached.is_ok());

        let Ok(view) = service.get_character(id).await else {
            panic!("character not found");
        };
        assert_eq!(view.logs.len(), 2);
        // Played on day 1, applied on day 20: it lands last.
        assert_eq!(view.logs.last().map(|l| l.id), Some(dm_log.id));
        assert_eq!(view.summary.total_level, 3);

        // The pool no longer holds it.
        assert!(service.get_dm_log(dm_log.id).await.is_err());
    }

    #[tokio::test]
    async fn attach_to_missing_character_restores_the_pool() {
        let service = make_service();
        let mut dm_draft = log_draft(1, 0, 0.0);
        dm_draft.dm = Some(DmDraft {
            name: "Morgan".to_string(),
            dci: None,
        });
        let Ok(dm_log) = service.create_dm_log(dm_draft).await else {
            panic!("dm log creation failed");
        };

        let missing = CharacterId::new();
        let result = service
            .attach_dm_log(dm_log.id, missing, Utc::now())
            .await;
        assert!(result.is_err());
        assert!(service.get_dm_log(dm_log.id).await.is_ok());
    }

    #[tokio::test]
    async fn dm_identity_is_reused_by_name() {
        let service = make_service();
        let id = seeded_character(&service).await;

        let mut first = log_draft(1, 0, 0.0);
        first.dm = Some(DmDraft {
            name: "Morgan".to_string(),
            dci: Some("1234567".to_string()),
        });
        let _ = service.append_log(id, first).await;

        let mut second = log_draft(2, 0, 0.0);
        second.dm = Some(DmDraft {
            name: "Morgan".to_string(),
            dci: None,
        });
        let _ = service.append_log(id, second).await;

        let records = service.dungeon_masters().await;
        assert_eq!(records.len(), 1);
        let Some(record) = records.first() else {
            panic!("expected one record");
        };
        assert_eq!(record.logs.len(), 2);
        assert_eq!(record.dm.dci.as_deref(), Some("1234567"));
    }

    #[tokio::test]
    async fn unattached_dm_log_cannot_drop_items() {
        let service = make_service();
        let mut draft = log_draft(1, 0, 0.0);
        draft.magic_items_lost.push(ItemId::new());
        let result = service.create_dm_log(draft).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn bad_dci_is_rejected() {
        let service = make_service();
        let id = seeded_character(&service).await;
        let mut draft = log_draft(1, 0, 0.0);
        draft.dm = Some(DmDraft {
            name: "Morgan".to_string(),
            dci: Some("12345678901".to_string()),
        });
        assert!(service.append_log(id, draft).await.is_err());
    }
}
