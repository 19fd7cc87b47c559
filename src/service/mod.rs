//! Service layer: orchestration and memoization over the domain.

pub mod character_service;
pub mod summary_cache;

pub use character_service::{
    CharacterDraft, CharacterService, CharacterView, DmDraft, GrantDraft, LogDraft,
};
pub use summary_cache::SummaryCache;
