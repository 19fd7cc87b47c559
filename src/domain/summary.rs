//! Log summary reducer: derived character statistics.
//!
//! [`summarize`] folds a character's ordered log history into the totals
//! shown on the log sheet. It is a pure single pass over the input: no
//! I/O, no shared state, no failure modes. Callers are expected to pass
//! logs ascending by effective date; the [`super::Ledger`] guarantees
//! that ordering.

use serde::Serialize;
use utoipa::ToSchema;

use super::{LogEntry, LogId};

/// Levels contributed by one specific log entry.
///
/// A raw per-log projection, not a running total: consumers rebuild the
/// running level themselves by replaying the list in order, which lets a
/// table show "level N as of this row" progressively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LogLevels {
    /// The contributing log.
    pub id: LogId,
    /// Levels gained on that log.
    pub levels: u32,
}

/// Aggregate totals derived from a character's full log history.
///
/// Recomputed on every read, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Summary {
    /// Current character level: 1 + the sum of all level deltas.
    pub total_level: u32,
    /// Adventurers League tier bracket for the current level.
    pub tier: u8,
    /// Net gold across all logs. May be negative; clamping is a
    /// write-path policy, not a reducer concern.
    pub total_gold: f64,
    /// Net downtime days across all logs.
    pub total_dtd: i32,
    /// Per-log level contributions in log order.
    pub log_levels: Vec<LogLevels>,
}

/// Tier bracket for a character level.
///
/// Boundary levels belong to the higher tier: 1–4 → tier 1, 5–10 →
/// tier 2, 11–16 → tier 3, 17+ → tier 4.
#[must_use]
pub const fn tier_for_level(level: u32) -> u8 {
    if level < 5 {
        1
    } else if level < 11 {
        2
    } else if level < 17 {
        3
    } else {
        4
    }
}

/// Folds an ordered log history into a [`Summary`].
///
/// An empty history is valid and yields a fresh level-1 character with
/// zero totals. The reducer assumes well-typed numeric input and never
/// clamps: negative running gold or downtime is preserved as-is.
#[must_use]
pub fn summarize(logs: &[LogEntry]) -> Summary {
    let mut total_level: u32 = 1;
    let mut total_gold = 0.0;
    let mut total_dtd: i32 = 0;
    let mut log_levels = Vec::with_capacity(logs.len());

    for log in logs {
        total_level = total_level.saturating_add(log.level);
        total_gold += log.gold;
        total_dtd = total_dtd.saturating_add(log.dtd);
        log_levels.push(LogLevels {
            id: log.id,
            levels: log.level,
        });
    }

    Summary {
        total_level,
        tier: tier_for_level(total_level),
        total_gold,
        total_dtd,
        log_levels,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{CharacterId, LogKind};
    use chrono::{TimeZone, Utc};

    fn log_on_day(day: u32, level: u32, gold: f64, dtd: i32) -> LogEntry {
        LogEntry {
            id: LogId::new(),
            name: format!("session {day}"),
            date: Utc
                .with_ymd_and_hms(2024, 1, day, 19, 0, 0)
                .single()
                .unwrap_or_default(),
            applied_date: None,
            kind: LogKind::Game,
            is_dm_log: false,
            character_id: Some(CharacterId::new()),
            dm: None,
            experience: 0,
            acp: 0,
            tcp: 0,
            level,
            gold,
            dtd,
            description: String::new(),
            created_at: Utc::now(),
            magic_items_gained: vec![],
            magic_items_lost: vec![],
            story_awards_gained: vec![],
            story_awards_lost: vec![],
        }
    }

    #[test]
    fn empty_history_is_a_fresh_character() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_level, 1);
        assert_eq!(summary.tier, 1);
        assert_eq!(summary.total_gold, 0.0);
        assert_eq!(summary.total_dtd, 0);
        assert!(summary.log_levels.is_empty());
    }

    #[test]
    fn single_log_accumulates() {
        // One log with level 3 and 50 gold: level 4, tier 1, 50 gold.
        let summary = summarize(&[log_on_day(1, 3, 50.0, 0)]);
        assert_eq!(summary.total_level, 4);
        assert_eq!(summary.tier, 1);
        assert_eq!(summary.total_gold, 50.0);
    }

    #[test]
    fn total_level_is_one_plus_deltas() {
        let logs = vec![
            log_on_day(1, 2, 0.0, 0),
            log_on_day(2, 2, 0.0, 0),
            log_on_day(3, 1, 0.0, 0),
        ];
        let summary = summarize(&logs);
        assert_eq!(summary.total_level, 6);
        assert_eq!(summary.tier, 2);
    }

    #[test]
    fn log_levels_is_a_projection_not_a_running_total() {
        let logs = vec![
            log_on_day(1, 2, 0.0, 0),
            log_on_day(2, 2, 0.0, 0),
            log_on_day(3, 1, 0.0, 0),
        ];
        let summary = summarize(&logs);
        let levels: Vec<u32> = summary.log_levels.iter().map(|l| l.levels).collect();
        assert_eq!(levels, vec![2, 2, 1]);

        // Consumers replay the projection in order; the running total at
        // the second row is 1 + 2 + 2 = 5.
        let running: u32 = 1 + levels.iter().take(2).sum::<u32>();
        assert_eq!(running, 5);
        assert_eq!(tier_for_level(running), 2);
    }

    #[test]
    fn gold_and_downtime_are_not_clamped() {
        let logs = vec![log_on_day(1, 0, -100.0, -3), log_on_day(2, 0, 50.0, 1)];
        let summary = summarize(&logs);
        assert_eq!(summary.total_gold, -50.0);
        assert_eq!(summary.total_dtd, -2);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier_for_level(1), 1);
        assert_eq!(tier_for_level(4), 1);
        assert_eq!(tier_for_level(5), 2);
        assert_eq!(tier_for_level(10), 2);
        assert_eq!(tier_for_level(11), 3);
        assert_eq!(tier_for_level(16), 3);
        assert_eq!(tier_for_level(17), 4);
        assert_eq!(tier_for_level(20), 4);
    }

    #[test]
    fn summarize_is_idempotent() {
        let logs = vec![log_on_day(1, 3, 25.0, 2), log_on_day(2, 1, -5.0, 0)];
        let first = summarize(&logs);
        let second = summarize(&logs);
        assert_eq!(first, second);
    }
}
