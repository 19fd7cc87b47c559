//! # league-ledger
//!
//! REST API service for tracking D&D Adventurers League character
//! progression.
//!
//! Players log game sessions against characters (experience, gold, magic
//! items, story awards) and Dungeon Masters log sessions they ran,
//! optionally attaching them to a character later. Derived character
//! statistics are never stored: the aggregation engine recomputes them on
//! every read by replaying the character's ordered log history.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── CharacterService (service/)
//!     ├── SummaryCache (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Aggregation Engine (domain/summary, domain/inventory)
//!     └── Ledger (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
