//! Battle participants: attributes, resources, and rewards.
//!
//! Resources (HP/MP) are private so the `0 <= current <= max` invariant can
//! only be broken by constructing a combatant from bad roster data, which
//! `check_invariants` reports.

use serde::{Deserialize, Serialize};

use super::action::{ItemId, SpellId};
use super::entity::{CombatantId, Side};
use crate::error::{CombatError, Result};

/// Core attributes used by formulas and the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i64,
    pub dexterity: i64,
    pub intellect: i64,
    pub wisdom: i64,
    pub stamina: i64,
}

impl Attributes {
    /// Create attributes in the conventional order.
    #[must_use]
    pub const fn new(
        strength: i64,
        dexterity: i64,
        intellect: i64,
        wisdom: i64,
        stamina: i64,
    ) -> Self {
        Self {
            strength,
            dexterity,
            intellect,
            wisdom,
            stamina,
        }
    }
}

/// Damage resistances in percent (0 = none, 100 = immune).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resistances {
    pub physical: i64,
    pub magical: i64,
}

/// A mutable combat resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Hp,
    Mp,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Hp => write!(f, "HP"),
            Resource::Mp => write!(f, "MP"),
        }
    }
}

/// What an enemy leaves behind when the battle is won.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub experience: u64,
    pub gold: u64,
    /// Candidate drops; one is drawn per defeated enemy.
    pub loot_table: Vec<ItemId>,
    /// World flags raised when this enemy is defeated.
    pub flags_when_defeated: Vec<u32>,
}

/// A battle participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    side: Side,
    pub level: u32,
    pub attributes: Attributes,
    pub resistances: Resistances,
    current_hp: i64,
    max_hp: i64,
    current_mp: i64,
    max_mp: i64,
    /// Spells this combatant can cast.
    pub spells: Vec<SpellId>,
    /// Rewards for defeating this combatant (enemies only).
    pub rewards: Option<Rewards>,
}

impl Combatant {
    /// Create a level 1 combatant with 1 HP and no MP.
    ///
    /// Use the builder methods to fill in roster data. The side is assigned
    /// when the combatant joins a battle.
    pub fn new(id: CombatantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            side: Side::Party,
            level: 1,
            attributes: Attributes::default(),
            resistances: Resistances::default(),
            current_hp: 1,
            max_hp: 1,
            current_mp: 0,
            max_mp: 0,
            spells: Vec::new(),
            rewards: None,
        }
    }

    // === Builder ===

    /// Set the level (builder pattern).
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set core attributes (builder pattern).
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set dexterity only (builder pattern).
    #[must_use]
    pub fn with_dexterity(mut self, dexterity: i64) -> Self {
        self.attributes.dexterity = dexterity;
        self
    }

    /// Set max HP and fill current HP (builder pattern).
    #[must_use]
    pub fn with_hp(mut self, max_hp: i64) -> Self {
        self.max_hp = max_hp;
        self.current_hp = max_hp;
        self
    }

    /// Set current HP independently of max HP (builder pattern).
    #[must_use]
    pub fn with_current_hp(mut self, current_hp: i64) -> Self {
        self.current_hp = current_hp;
        self
    }

    /// Set max MP and fill current MP (builder pattern).
    #[must_use]
    pub fn with_mp(mut self, max_mp: i64) -> Self {
        self.max_mp = max_mp;
        self.current_mp = max_mp;
        self
    }

    /// Set current MP independently of max MP (builder pattern).
    #[must_use]
    pub fn with_current_mp(mut self, current_mp: i64) -> Self {
        self.current_mp = current_mp;
        self
    }

    /// Set resistances (builder pattern).
    #[must_use]
    pub fn with_resistances(mut self, physical: i64, magical: i64) -> Self {
        self.resistances = Resistances { physical, magical };
        self
    }

    /// Teach a spell (builder pattern).
    #[must_use]
    pub fn with_spell(mut self, spell: SpellId) -> Self {
        if !self.spells.contains(&spell) {
            self.spells.push(spell);
        }
        self
    }

    /// Set enemy rewards (builder pattern).
    #[must_use]
    pub fn with_rewards(mut self, rewards: Rewards) -> Self {
        self.rewards = Some(rewards);
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn id(&self) -> CombatantId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The side this combatant fights on.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    pub(crate) fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    #[must_use]
    pub fn current_hp(&self) -> i64 {
        self.current_hp
    }

    #[must_use]
    pub fn max_hp(&self) -> i64 {
        self.max_hp
    }

    #[must_use]
    pub fn current_mp(&self) -> i64 {
        self.current_mp
    }

    #[must_use]
    pub fn max_mp(&self) -> i64 {
        self.max_mp
    }

    /// Current value of a resource.
    #[must_use]
    pub fn current(&self, resource: Resource) -> i64 {
        match resource {
            Resource::Hp => self.current_hp,
            Resource::Mp => self.current_mp,
        }
    }

    /// Maximum value of a resource.
    #[must_use]
    pub fn maximum(&self, resource: Resource) -> i64 {
        match resource {
            Resource::Hp => self.max_hp,
            Resource::Mp => self.max_mp,
        }
    }

    /// Is this combatant down (0 HP)?
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.current_hp == 0
    }

    /// Is the resource already at its maximum?
    #[must_use]
    pub fn is_full(&self, resource: Resource) -> bool {
        self.current(resource) >= self.maximum(resource)
    }

    // === Mutation (resolution only) ===

    /// Apply a signed delta to a resource, clamping into `0..=max`.
    ///
    /// Returns the change actually applied.
    pub(crate) fn apply_delta(&mut self, resource: Resource, delta: i64) -> i64 {
        let (current, max) = match resource {
            Resource::Hp => (&mut self.current_hp, self.max_hp),
            Resource::Mp => (&mut self.current_mp, self.max_mp),
        };
        let before = *current;
        *current = before.saturating_add(delta).clamp(0, max.max(0));
        *current - before
    }

    /// Verify resource invariants.
    pub fn check_invariants(&self) -> Result<()> {
        if self.max_hp <= 0 {
            return Err(CombatError::InvariantViolation(format!(
                "{} has non-positive max HP {}",
                self.id, self.max_hp
            )));
        }
        if !(0..=self.max_hp).contains(&self.current_hp) {
            return Err(CombatError::InvariantViolation(format!(
                "{} HP {} outside 0..={}",
                self.id, self.current_hp, self.max_hp
            )));
        }
        if self.max_mp < 0 || !(0..=self.max_mp).contains(&self.current_mp) {
            return Err(CombatError::InvariantViolation(format!(
                "{} MP {} outside 0..={}",
                self.id, self.current_mp, self.max_mp
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Combatant {
        Combatant::new(CombatantId::new(1), "Knight")
            .with_level(3)
            .with_attributes(Attributes::new(8, 5, 2, 2, 6))
            .with_hp(30)
            .with_mp(10)
    }

    #[test]
    fn test_builder() {
        let c = knight();
        assert_eq!(c.name(), "Knight");
        assert_eq!(c.level, 3);
        assert_eq!(c.attributes.dexterity, 5);
        assert_eq!(c.current_hp(), 30);
        assert_eq!(c.max_mp(), 10);
        assert!(c.check_invariants().is_ok());
    }

    #[test]
    fn test_apply_delta_clamps_to_zero() {
        let mut c = knight();
        let applied = c.apply_delta(Resource::Hp, -50);
        assert_eq!(applied, -30);
        assert_eq!(c.current_hp(), 0);
        assert!(c.is_down());
    }

    #[test]
    fn test_apply_delta_clamps_to_max() {
        let mut c = knight().with_current_hp(25);
        let applied = c.apply_delta(Resource::Hp, 100);
        assert_eq!(applied, 5);
        assert!(c.is_full(Resource::Hp));
    }

    #[test]
    fn test_apply_delta_mp() {
        let mut c = knight();
        assert_eq!(c.apply_delta(Resource::Mp, -4), -4);
        assert_eq!(c.current(Resource::Mp), 6);
        assert_eq!(c.current(Resource::Hp), 30);
    }

    #[test]
    fn test_invariant_violation_reported() {
        let c = knight().with_current_hp(31);
        assert!(matches!(
            c.check_invariants(),
            Err(CombatError::InvariantViolation(_))
        ));

        let c = knight().with_current_mp(-1);
        assert!(c.check_invariants().is_err());
    }

    #[test]
    fn test_with_spell_deduplicates() {
        let c = knight().with_spell(SpellId::new(1)).with_spell(SpellId::new(1));
        assert_eq!(c.spells, vec![SpellId::new(1)]);
    }
}
