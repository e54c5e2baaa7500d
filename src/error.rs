//! Error types surfaced by the combat engine.
//!
//! Capability failures (enchantments, presentation) have their own error
//! types and are recovered inside the engine. Everything in `CombatError` is
//! either rejected input that the caller can retry or a broken invariant that
//! halts the battle.

use thiserror::Error;

use crate::combat::EventId;
use crate::core::{CombatantId, ItemId, SpellId};

pub type Result<T> = std::result::Result<T, CombatError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("target {target} is not on either living roster")]
    InvalidTarget { target: CombatantId },

    #[error("{executor} is not on the living roster")]
    InvalidExecutor { executor: CombatantId },

    #[error("event {0} was already resolved")]
    AlreadyResolvedEvent(EventId),

    #[error("menu selection {index} out of range ({available} options)")]
    InvalidSelection { index: usize, available: usize },

    #[error("{item} is not available")]
    ItemUnavailable { item: ItemId },

    #[error("{caster} does not know {spell}")]
    UnknownSpell { caster: CombatantId, spell: SpellId },

    #[error("input orchestrator closed")]
    InputClosed,

    #[error("battle is already over")]
    BattleOver,

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl CombatError {
    /// Errors that mean the engine must halt rather than re-request input.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CombatError::AlreadyResolvedEvent(_)
                | CombatError::InvariantViolation(_)
                | CombatError::InputClosed
                | CombatError::BattleOver
        )
    }
}
