//! How a battle ended.

use serde::{Deserialize, Serialize};

use crate::core::ItemId;

/// Rewards for winning a battle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spoils {
    pub experience: u64,
    pub gold: u64,
    /// Loot added to the inventory, one draw per defeated enemy.
    pub items: Vec<ItemId>,
    /// Story flags raised by the defeated enemies.
    pub flags: Vec<u32>,
}

/// Result of a finished battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Every enemy is down.
    Won(Spoils),
    /// Every party member is down.
    Lost,
    /// The party ran.
    Fled,
}

impl BattleOutcome {
    #[must_use]
    pub fn is_victory(&self) -> bool {
        matches!(self, BattleOutcome::Won(_))
    }

    /// Spoils, if the battle was won.
    #[must_use]
    pub fn spoils(&self) -> Option<&Spoils> {
        match self {
            BattleOutcome::Won(spoils) => Some(spoils),
            BattleOutcome::Lost | BattleOutcome::Fled => None,
        }
    }
}

impl std::fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BattleOutcome::Won(spoils) => {
                write!(f, "Victory ({} exp, {} gold)", spoils.experience, spoils.gold)
            }
            BattleOutcome::Lost => write!(f, "Defeat"),
            BattleOutcome::Fled => write!(f, "Escaped"),
        }
    }
}
