//! Enemy decisions.
//!
//! Each living enemy declares exactly one action per round, after the party
//! has confirmed theirs and before scheduling.

use crate::core::{BattleRng, BattleState, Combatant, PlannedAction, Side};

/// Chooses an enemy's action for the round.
pub trait EnemyPolicy: Send + Sync {
    /// `None` means the enemy has nothing to do (no living opponents).
    fn decide(
        &self,
        enemy: &Combatant,
        state: &BattleState,
        rng: &mut BattleRng,
    ) -> Option<PlannedAction>;
}

/// Attacks the lowest-index living party member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FirstLivingTarget;

impl EnemyPolicy for FirstLivingTarget {
    fn decide(
        &self,
        enemy: &Combatant,
        state: &BattleState,
        _rng: &mut BattleRng,
    ) -> Option<PlannedAction> {
        state
            .living(enemy.side().opponent())
            .next()
            .map(|target| PlannedAction::Attack { target: target.id() })
    }
}

/// Attacks a random living party member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RandomTarget;

impl EnemyPolicy for RandomTarget {
    fn decide(
        &self,
        enemy: &Combatant,
        state: &BattleState,
        rng: &mut BattleRng,
    ) -> Option<PlannedAction> {
        let targets: Vec<_> = state.living(enemy.side().opponent()).map(Combatant::id).collect();
        rng.choose(&targets).map(|&target| PlannedAction::Attack { target })
    }
}

/// The policy used when none is configured.
#[must_use]
pub fn default_policy() -> Box<dyn EnemyPolicy> {
    Box::new(FirstLivingTarget)
}
