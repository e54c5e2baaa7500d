//! One side of a battle: an ordered roster plus its active (living) subset.

use serde::{Deserialize, Serialize};

use super::combatant::Combatant;
use super::entity::{CombatantId, Side};

/// An ordered roster of combatants fighting on one side.
///
/// `members` keeps every combatant for the whole battle (spoils and
/// reporting need the fallen). `active` is the living roster in roster
/// order; defeated combatants are removed from it during end-of-battle
/// bookkeeping and never return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    side: Side,
    members: Vec<Combatant>,
    active: Vec<CombatantId>,
}

impl Party {
    /// Build a party, tagging every member with `side`.
    ///
    /// Members that enter the battle already at 0 HP are not active.
    pub fn new(side: Side, members: impl IntoIterator<Item = Combatant>) -> Self {
        let members: Vec<Combatant> = members
            .into_iter()
            .map(|mut m| {
                m.set_side(side);
                m
            })
            .collect();
        let active = members.iter().filter(|m| !m.is_down()).map(Combatant::id).collect();
        Self {
            side,
            members,
            active,
        }
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// All members in roster order, including the fallen.
    #[must_use]
    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    /// Living roster ids in roster order.
    #[must_use]
    pub fn active(&self) -> &[CombatantId] {
        &self.active
    }

    /// Living members in roster order.
    pub fn living(&self) -> impl Iterator<Item = &Combatant> {
        self.active.iter().filter_map(|id| self.get(*id))
    }

    /// Number of members (living or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.members.iter().any(|m| m.id() == id)
    }

    /// Is this combatant on the living roster?
    #[must_use]
    pub fn is_active(&self, id: CombatantId) -> bool {
        self.active.contains(&id)
    }

    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.members.iter().find(|m| m.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.members.iter_mut().find(|m| m.id() == id)
    }

    /// Remove a combatant from the living roster.
    ///
    /// Returns `true` if it was active.
    pub(crate) fn remove_from_active(&mut self, id: CombatantId) -> bool {
        let before = self.active.len();
        self.active.retain(|&a| a != id);
        self.active.len() != before
    }

    /// Active combatants that have dropped to 0 HP since the last sweep.
    #[must_use]
    pub fn fallen_but_active(&self) -> Vec<CombatantId> {
        self.living().filter(|m| m.is_down()).map(Combatant::id).collect()
    }

    /// A party is defeated once every member has 0 HP or nobody is left
    /// on the living roster.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.active.is_empty() || self.members.iter().all(Combatant::is_down)
    }
}
