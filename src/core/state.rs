//! Battle state: both rosters plus per-battle bookkeeping.
//!
//! ## BattleState
//!
//! - The party and enemy rosters (`SideMap<Party>`)
//! - Round counter
//! - Guarded combatants (defending this round)
//! - History of every result applied so far
//!
//! Uses `im` persistent structures for the guard set and history so that
//! snapshots handed to observers are cheap to clone.

use im::{HashSet as ImHashSet, Vector};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::combatant::{Combatant, Resource};
use super::entity::{CombatantId, Side, SideMap};
use super::party::Party;
use crate::combat::CombatResult;
use crate::error::{CombatError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattleState {
    sides: SideMap<Party>,

    /// Current round (starts at 0, incremented when input collection begins).
    pub round: u32,

    /// Combatants defending until the end of the round.
    guarded: ImHashSet<CombatantId>,

    /// Every result applied so far, in resolution order.
    history: Vector<CombatResult>,
}

impl BattleState {
    /// Build the state from two rosters.
    ///
    /// Fails if either roster is empty or has nobody standing, if an id is
    /// used twice, or if any combatant breaks its resource invariants.
    pub fn new(
        party: impl IntoIterator<Item = Combatant>,
        enemies: impl IntoIterator<Item = Combatant>,
    ) -> Result<Self> {
        let sides = SideMap::from_parts(
            Party::new(Side::Party, party),
            Party::new(Side::Enemies, enemies),
        );

        let mut seen = FxHashSet::default();
        for (side, party) in sides.iter() {
            if party.active().is_empty() {
                return Err(CombatError::InvariantViolation(format!(
                    "{} roster has no combatant able to fight",
                    side
                )));
            }
            for member in party.members() {
                member.check_invariants()?;
                if !seen.insert(member.id()) {
                    return Err(CombatError::InvariantViolation(format!(
                        "{} appears more than once",
                        member.id()
                    )));
                }
            }
        }

        Ok(Self {
            sides,
            round: 0,
            guarded: ImHashSet::new(),
            history: Vector::new(),
        })
    }

    // === Rosters ===

    #[must_use]
    pub fn party(&self, side: Side) -> &Party {
        &self.sides[side]
    }

    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        Side::ALL.iter().find_map(|&side| self.sides[side].get(id))
    }

    /// Which side a combatant fights on.
    #[must_use]
    pub fn side_of(&self, id: CombatantId) -> Option<Side> {
        Side::ALL.into_iter().find(|&side| self.sides[side].contains(id))
    }

    /// Is this combatant on either living roster?
    #[must_use]
    pub fn is_active(&self, id: CombatantId) -> bool {
        Side::ALL.iter().any(|&side| self.sides[side].is_active(id))
    }

    /// Living members of a side in roster order.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.sides[side].living()
    }

    #[must_use]
    pub fn is_defeated(&self, side: Side) -> bool {
        self.sides[side].is_defeated()
    }

    // === Mutation (resolution only) ===

    /// Apply a signed change to a combatant's resource.
    ///
    /// Returns the change actually applied after clamping, or `None` if the
    /// combatant is unknown.
    pub(crate) fn apply(&mut self, id: CombatantId, resource: Resource, delta: i64) -> Option<i64> {
        let side = self.side_of(id)?;
        self.sides[side].get_mut(id).map(|c| c.apply_delta(resource, delta))
    }

    /// Remove every active combatant at 0 HP from its living roster.
    ///
    /// Returns the removed ids, party side first.
    pub(crate) fn sweep_fallen(&mut self) -> Vec<CombatantId> {
        let mut removed = Vec::new();
        for side in Side::ALL {
            for id in self.sides[side].fallen_but_active() {
                if self.sides[side].remove_from_active(id) {
                    self.guarded.remove(&id);
                    removed.push(id);
                }
            }
        }
        removed
    }

    pub(crate) fn guard(&mut self, id: CombatantId) {
        self.guarded.insert(id);
    }

    #[must_use]
    pub fn is_guarded(&self, id: CombatantId) -> bool {
        self.guarded.contains(&id)
    }

    pub(crate) fn clear_guards(&mut self) {
        self.guarded = ImHashSet::new();
    }

    pub(crate) fn record(&mut self, result: CombatResult) {
        self.history.push_back(result);
    }

    /// Every result applied so far.
    #[must_use]
    pub fn history(&self) -> &Vector<CombatResult> {
        &self.history
    }

    /// Verify every combatant's resource invariants.
    pub fn check_invariants(&self) -> Result<()> {
        for (_, party) in self.sides.iter() {
            for member in party.members() {
                member.check_invariants()?;
            }
        }
        Ok(())
    }
}
