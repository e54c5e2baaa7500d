//! Results emitted by resolving combat events.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::event::EventId;
use crate::core::{ActionKind, CombatantId, Resource};

/// The outcome of one action on one target.
///
/// `resulting_value` is signed: negative is damage/drain, positive is
/// healing/restoration, zero is "no effect".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    /// The event that produced this result.
    pub event: EventId,
    pub kind: ActionKind,
    /// `None` for end-of-round effects that have no acting combatant.
    pub executor: Option<CombatantId>,
    pub target: CombatantId,
    /// Which resource the value applied to.
    pub resource: Resource,
    pub resulting_value: i64,
    /// The target was at 0 HP after this result applied.
    pub target_down: bool,
}

impl CombatResult {
    /// Create a result on the HP resource.
    pub fn new(
        event: EventId,
        kind: ActionKind,
        executor: Option<CombatantId>,
        target: CombatantId,
        resulting_value: i64,
        target_down: bool,
    ) -> Self {
        Self {
            event,
            kind,
            executor,
            target,
            resource: Resource::Hp,
            resulting_value,
            target_down,
        }
    }

    /// A zero-value result, used when an action had no effect.
    pub fn no_effect(
        event: EventId,
        kind: ActionKind,
        executor: Option<CombatantId>,
        target: CombatantId,
        target_down: bool,
    ) -> Self {
        Self::new(event, kind, executor, target, 0, target_down)
    }

    /// Set the affected resource (builder pattern).
    #[must_use]
    pub fn on(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self
    }

    #[must_use]
    pub fn is_damage(&self) -> bool {
        self.resulting_value < 0
    }

    #[must_use]
    pub fn is_no_effect(&self) -> bool {
        self.resulting_value == 0
    }
}

/// Results of one resolution. Most events yield exactly one.
pub type CombatResults = SmallVec<[CombatResult; 2]>;
