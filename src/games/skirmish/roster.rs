//! Skirmish rosters.

use std::sync::Arc;

use crate::battle::{Battle, BattleBuilder};
use crate::core::{Attributes, BattleConfig, Combatant, CombatantId, ItemId, Rewards, SpellId};
use crate::effects::{Grimoire, Periodic, Spell, SpellKind};
use crate::stores::{ItemDef, ItemEffect, Satchel};

/// Item ids used by the skirmish.
pub const POTION: ItemId = ItemId(1);
pub const ETHER: ItemId = ItemId(2);

/// Spell ids used by the skirmish.
pub const FIRE: SpellId = SpellId(1);
pub const CURE: SpellId = SpellId(2);

/// Flag raised when the skirmish goblin is defeated.
pub const GOBLIN_DEFEATED: u32 = 1;

/// Party members are numbered from 1, enemies from here.
const FIRST_ENEMY_ID: u32 = 100;

/// A ready-to-fight encounter.
#[derive(Clone, Debug)]
pub struct Skirmish {
    pub party: Vec<Combatant>,
    pub enemies: Vec<Combatant>,
    pub grimoire: Grimoire,
    pub satchel: Satchel,
    /// Enemies that start the battle poisoned.
    pub poisoned: Vec<CombatantId>,
}

impl Skirmish {
    /// Turn the encounter into a battle builder.
    pub fn battle(self, config: BattleConfig) -> BattleBuilder {
        let mut builder = Battle::builder(self.party, self.enemies)
            .with_config(config)
            .with_grimoire(self.grimoire)
            .with_inventory(self.satchel);
        for bearer in self.poisoned {
            builder = builder.with_enchantment(bearer, Arc::new(Periodic::poison(2)));
        }
        builder
    }
}

/// Builder for creating a [`Skirmish`].
pub struct SkirmishBuilder {
    party_size: usize,
    enemy_count: usize,
    potions: u32,
    poisoned_enemies: bool,
}

impl Default for SkirmishBuilder {
    fn default() -> Self {
        Self {
            party_size: 3,
            enemy_count: 3,
            potions: 3,
            poisoned_enemies: false,
        }
    }
}

impl SkirmishBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn party_size(mut self, size: usize) -> Self {
        assert!((1..=4).contains(&size), "Party size must be 1-4");
        self.party_size = size;
        self
    }

    pub fn enemy_count(mut self, count: usize) -> Self {
        assert!((1..=6).contains(&count), "Enemy count must be 1-6");
        self.enemy_count = count;
        self
    }

    pub fn potions(mut self, potions: u32) -> Self {
        self.potions = potions;
        self
    }

    /// Start every enemy poisoned.
    pub fn poisoned_enemies(mut self, poisoned: bool) -> Self {
        self.poisoned_enemies = poisoned;
        self
    }

    pub fn build(self) -> Skirmish {
        let party: Vec<Combatant> = (0..self.party_size).map(party_member).collect();
        let enemies: Vec<Combatant> = (0..self.enemy_count).map(enemy).collect();
        let poisoned = if self.poisoned_enemies {
            enemies.iter().map(Combatant::id).collect()
        } else {
            Vec::new()
        };

        let grimoire = Grimoire::new()
            .with(Spell::new(FIRE, "Fire", 4, 6, SpellKind::Harm))
            .with(Spell::new(CURE, "Cure", 3, 8, SpellKind::Mend));

        let satchel = Satchel::new()
            .with_item(ItemDef::new(POTION, "Potion", ItemEffect::Restoration, 25), self.potions)
            .with_item(ItemDef::new(ETHER, "Ether", ItemEffect::ManaRecovery, 10), 1)
            .with_gold(10);

        Skirmish {
            party,
            enemies,
            grimoire,
            satchel,
            poisoned,
        }
    }
}

fn party_member(slot: usize) -> Combatant {
    let id = CombatantId::new(slot as u32 + 1);
    match slot {
        0 => Combatant::new(id, "Knight")
            .with_level(3)
            .with_attributes(Attributes::new(8, 4, 2, 2, 7))
            .with_resistances(20, 0)
            .with_hp(40),
        1 => Combatant::new(id, "Mage")
            .with_level(3)
            .with_attributes(Attributes::new(3, 5, 9, 6, 3))
            .with_resistances(0, 25)
            .with_hp(24)
            .with_mp(20)
            .with_spell(FIRE)
            .with_spell(CURE),
        2 => Combatant::new(id, "Thief")
            .with_level(3)
            .with_attributes(Attributes::new(5, 9, 3, 3, 4))
            .with_hp(28),
        _ => Combatant::new(id, "Cleric")
            .with_level(3)
            .with_attributes(Attributes::new(4, 3, 5, 9, 5))
            .with_resistances(0, 15)
            .with_hp(30)
            .with_mp(16)
            .with_spell(CURE),
    }
}

fn enemy(index: usize) -> Combatant {
    let id = CombatantId::new(FIRST_ENEMY_ID + index as u32);
    let letter = char::from(b'A' + (index % 26) as u8);
    match index % 3 {
        0 => Combatant::new(id, format!("Slime {}", letter))
            .with_attributes(Attributes::new(4, 2, 1, 1, 4))
            .with_hp(18)
            .with_rewards(Rewards {
                experience: 4,
                gold: 3,
                loot_table: vec![POTION],
                flags_when_defeated: Vec::new(),
            }),
        1 => Combatant::new(id, format!("Goblin {}", letter))
            .with_level(2)
            .with_attributes(Attributes::new(6, 6, 2, 2, 5))
            .with_resistances(10, 0)
            .with_hp(24)
            .with_rewards(Rewards {
                experience: 9,
                gold: 12,
                loot_table: vec![POTION, ETHER],
                flags_when_defeated: vec![GOBLIN_DEFEATED],
            }),
        _ => Combatant::new(id, format!("Bat {}", letter))
            .with_attributes(Attributes::new(3, 10, 1, 1, 2))
            .with_hp(12)
            .with_rewards(Rewards {
                experience: 3,
                gold: 1,
                loot_table: Vec::new(),
                flags_when_defeated: Vec::new(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleOutcome;
    use crate::stores::Inventory;

    #[test]
    fn test_default_rosters() {
        let skirmish = SkirmishBuilder::new().build();
        let names: Vec<&str> = skirmish.party.iter().map(Combatant::name).collect();
        assert_eq!(names, vec!["Knight", "Mage", "Thief"]);
        let enemies: Vec<&str> = skirmish.enemies.iter().map(Combatant::name).collect();
        assert_eq!(enemies, vec!["Slime A", "Goblin B", "Bat C"]);
        assert_eq!(skirmish.satchel.available(POTION), 3);
        assert!(skirmish.poisoned.is_empty());
    }

    #[test]
    fn test_rosters_are_valid() {
        let skirmish = SkirmishBuilder::new().party_size(4).enemy_count(6).build();
        for combatant in skirmish.party.iter().chain(&skirmish.enemies) {
            combatant.check_invariants().unwrap();
        }
        assert_eq!(skirmish.enemies[5].id(), CombatantId::new(105));
    }

    #[test]
    #[should_panic(expected = "Party size must be 1-4")]
    fn test_party_size_bounds() {
        let _ = SkirmishBuilder::new().party_size(0);
    }

    #[tokio::test]
    async fn test_autopilot_battle_finishes() {
        let run = |seed| async move {
            let mut battle = SkirmishBuilder::new()
                .poisoned_enemies(true)
                .build()
                .battle(BattleConfig::instant().with_seed(seed))
                .build()
                .unwrap();
            let outcome = battle.run().await.unwrap();
            (outcome, battle.round())
        };

        let (outcome, rounds) = run(7).await;
        assert!(matches!(outcome, BattleOutcome::Won(_) | BattleOutcome::Lost));
        assert!(rounds >= 1);
        assert_eq!(run(7).await, (outcome, rounds));
    }
}
