//! Combat events: one queued action or effect pending resolution.
//!
//! Events are a tagged enum rather than a type hierarchy. The battle
//! resolves every variant through a single dispatch on `EventKind`.

use serde::{Deserialize, Serialize};

use crate::core::{ActionKind, CombatantId, ItemId, Orientation, SpellId};
use crate::triggers::AttachmentId;

/// Unique identifier for a combat event within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl EventId {
    /// Create a new event ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event({})", self.0)
    }
}

/// A main action declared for the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicAction {
    Attack,
    Defend,
    UseItem(ItemId),
    CastSpell(SpellId),
}

impl BasicAction {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            BasicAction::Attack => ActionKind::Attack,
            BasicAction::Defend => ActionKind::Defend,
            BasicAction::UseItem(_) => ActionKind::UseItem,
            BasicAction::CastSpell(_) => ActionKind::CastSpell,
        }
    }
}

/// What an event does when it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A declared main action.
    Basic(BasicAction),
    /// Status check on the executor before its main action (sleep, paralysis).
    ///
    /// The event's target mirrors the paired action's target.
    PreAttack {
        attachment: AttachmentId,
        /// The main action this hook guards.
        paired: EventId,
    },
    /// Follow-up after the executor's attack (elemental bonus, absorption).
    PostAttack {
        attachment: AttachmentId,
        /// The attack this hook follows.
        paired: EventId,
    },
    /// End-of-round effect on one bearer (regen, poison).
    PostTurn { attachment: AttachmentId },
}

/// Per-event lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    Pending,
    /// Presentation delay in progress; the outcome is not applied yet.
    Animating,
    Resolved,
}

/// One queued action or effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEvent {
    id: EventId,
    executor: CombatantId,
    target: Option<CombatantId>,
    orientation: Orientation,
    kind: EventKind,
}

impl CombatEvent {
    pub fn new(
        id: EventId,
        executor: CombatantId,
        target: Option<CombatantId>,
        orientation: Orientation,
        kind: EventKind,
    ) -> Self {
        Self {
            id,
            executor,
            target,
            orientation,
            kind,
        }
    }

    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn executor(&self) -> CombatantId {
        self.executor
    }

    #[must_use]
    pub fn target(&self) -> Option<CombatantId> {
        self.target
    }

    /// Presentation-only facing.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The reported action kind.
    #[must_use]
    pub fn action_kind(&self) -> ActionKind {
        match self.kind {
            EventKind::Basic(action) => action.kind(),
            EventKind::PreAttack { .. }
            | EventKind::PostAttack { .. }
            | EventKind::PostTurn { .. } => ActionKind::Enchantment,
        }
    }

    /// Is this a declared main action (not an enchantment hook)?
    #[must_use]
    pub fn is_basic(&self) -> bool {
        matches!(self.kind, EventKind::Basic(_))
    }

    /// The combatant whose defeat turns this event into a no-op.
    ///
    /// Untargeted events (defend, post-turn) depend on their executor.
    #[must_use]
    pub fn subject(&self) -> CombatantId {
        self.target.unwrap_or(self.executor)
    }

    /// The main action an enchantment hook is paired with.
    #[must_use]
    pub fn paired(&self) -> Option<EventId> {
        match self.kind {
            EventKind::PreAttack { paired, .. } | EventKind::PostAttack { paired, .. } => {
                Some(paired)
            }
            EventKind::Basic(_) | EventKind::PostTurn { .. } => None,
        }
    }

    /// The enchantment attachment a hook event applies.
    #[must_use]
    pub fn attachment(&self) -> Option<AttachmentId> {
        match self.kind {
            EventKind::PreAttack { attachment, .. }
            | EventKind::PostAttack { attachment, .. }
            | EventKind::PostTurn { attachment } => Some(attachment),
            EventKind::Basic(_) => None,
        }
    }
}
