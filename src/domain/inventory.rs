//! Item / award inventory resolver.
//!
//! [`resolve_inventory`] replays a character's ordered log history and
//! produces the granted magic items or story awards, each annotated with
//! the log that granted it and, when applicable, the log that dropped
//! it. Like the summary reducer it is pure and total: dangling loss
//! references are ignored rather than raised, and an empty history
//! yields an empty inventory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{ItemId, ItemKind, LogEntry, LogId};

/// A granted item or award with its grant/loss provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Possession {
    /// Grant identifier.
    pub id: ItemId,
    /// Item or award name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// The log that granted this entry.
    pub gained_at: LogId,
    /// The log that dropped this entry, if any.
    pub lost_at: Option<LogId>,
}

impl Possession {
    /// Whether the entry is still held (no loss recorded).
    #[must_use]
    pub const fn is_held(&self) -> bool {
        self.lost_at.is_none()
    }
}

/// Options for [`resolve_inventory`].
///
/// The default filter returns the full annotated grant list. With
/// `exclude_dropped` set, the result is narrowed to "what could still be
/// dropped as of editing the log `last_log_id`": entries granted at or
/// before that log and not lost strictly before it. An entry dropped
/// *at* the reference log is retained, so a user editing a drop-entry
/// still sees the item they chose to drop. An absent or unknown
/// `last_log_id` means a brand-new log at the end of the timeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryFilter {
    /// Exclude entries already dropped as of `last_log_id`.
    pub exclude_dropped: bool,
    /// Reference log for the exclusion boundary.
    pub last_log_id: Option<LogId>,
}

/// Replays `logs` (ascending by effective date) into the inventory of
/// the given kind.
///
/// Result order is grant order, stable across calls; display sorting is
/// a presentational concern layered on top (see [`super::stacking`]).
#[must_use]
pub fn resolve_inventory(
    logs: &[LogEntry],
    kind: ItemKind,
    filter: &InventoryFilter,
) -> Vec<Possession> {
    let mut granted: Vec<Possession> = Vec::new();
    let mut by_item: HashMap<ItemId, usize> = HashMap::new();
    let mut log_dates: HashMap<LogId, DateTime<Utc>> = HashMap::new();

    for log in logs {
        log_dates.insert(log.id, log.effective_date());

        for grant in log.grants(kind) {
            by_item.insert(grant.id, granted.len());
            granted.push(Possession {
                id: grant.id,
                name: grant.name.clone(),
                description: grant.description.clone(),
                gained_at: log.id,
                lost_at: None,
            });
        }

        for lost in log.losses(kind) {
            // A reference to a grant that never happened is a no-op.
            if let Some(&index) = by_item.get(lost)
                && let Some(entry) = granted.get_mut(index)
            {
                entry.lost_at = Some(log.id);
            }
        }
    }

    if !filter.exclude_dropped {
        return granted;
    }

    let last_date = filter
        .last_log_id
        .and_then(|id| log_dates.get(&id).copied());

    let Some(last_date) = last_date else {
        // Editing a brand-new log at the end of the timeline: everything
        // ever dropped is already gone.
        granted.retain(Possession::is_held);
        return granted;
    };

    granted.retain(|entry| {
        let gained = log_dates.get(&entry.gained_at).copied();
        let gained_in_range = gained.is_some_and(|d| d <= last_date);
        let lost_before = entry
            .lost_at
            .and_then(|id| log_dates.get(&id).copied())
            .is_some_and(|d| d < last_date);
        gained_in_range && !lost_before
    });
    granted
}
