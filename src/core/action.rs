//! Action vocabulary: what a combatant can declare for a round.
//!
//! A `PlannedAction` is what the input layer or an enemy policy decides.
//! The battle turns it into a queued `CombatEvent` once the target has been
//! validated against the living rosters.

use serde::{Deserialize, Serialize};

use super::entity::CombatantId;

/// Identifier for an inventory item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Create a new item ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Item({})", self.0)
    }
}

/// Identifier for a spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpellId(pub u32);

impl SpellId {
    /// Create a new spell ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SpellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Spell({})", self.0)
    }
}

/// The kind of a resolved action, as reported in combat results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Attack,
    Defend,
    UseItem,
    CastSpell,
    /// Any enchantment hook (pre-attack, post-attack, post-turn).
    Enchantment,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActionKind::Attack => "attack",
            ActionKind::Defend => "defend",
            ActionKind::UseItem => "use item",
            ActionKind::CastSpell => "cast spell",
            ActionKind::Enchantment => "enchantment",
        };
        write!(f, "{}", label)
    }
}

/// Presentation-only facing used to offset the acting sprite.
///
/// Party members face left toward the enemies, enemies face right.
/// Resolution never looks at this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Left,
    Right,
}

/// An action declared by a combatant before scheduling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlannedAction {
    /// Physical attack against one target.
    Attack { target: CombatantId },
    /// Guard until the end of the round.
    Defend,
    /// Use a consumable item on a target.
    UseItem { item: ItemId, target: CombatantId },
    /// Cast a known spell on a target.
    CastSpell { spell: SpellId, target: CombatantId },
    /// Run from the battle. Ends the battle immediately.
    Flee,
}

impl PlannedAction {
    /// The action's target, if it has one.
    #[must_use]
    pub fn target(&self) -> Option<CombatantId> {
        match self {
            PlannedAction::Attack { target }
            | PlannedAction::UseItem { target, .. }
            | PlannedAction::CastSpell { target, .. } => Some(*target),
            PlannedAction::Defend | PlannedAction::Flee => None,
        }
    }

    /// The reported action kind. `None` for flight, which never resolves.
    #[must_use]
    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            PlannedAction::Attack { .. } => Some(ActionKind::Attack),
            PlannedAction::Defend => Some(ActionKind::Defend),
            PlannedAction::UseItem { .. } => Some(ActionKind::UseItem),
            PlannedAction::CastSpell { .. } => Some(ActionKind::CastSpell),
            PlannedAction::Flee => None,
        }
    }
}
