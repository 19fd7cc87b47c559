//! Domain layer: ledger model, aggregation engine, and event system.
//!
//! This module contains the character ledger (the Log Store the engine
//! reads from), the pure aggregation engine (`summary`, `inventory`,
//! `stacking`), identity newtypes, and the event bus for broadcasting
//! state changes.

pub mod character;
pub mod event_bus;
pub mod id;
pub mod inventory;
pub mod ledger;
pub mod ledger_event;
pub mod log_entry;
pub mod stacking;
pub mod summary;

pub use character::{Character, CharacterRow};
pub use event_bus::EventBus;
pub use id::{CharacterId, DungeonMasterId, ItemId, LogId};
pub use inventory::{InventoryFilter, Possession, resolve_inventory};
pub use ledger::{CharacterEntry, DungeonMasterRecord, Ledger};
pub use ledger_event::LedgerEvent;
pub use log_entry::{DungeonMaster, ItemGrant, ItemKind, LogEntry, LogKind};
pub use summary::{LogLevels, Summary, summarize, tier_for_level};
