//! Damage and healing formulas.
//!
//! The battle never computes numbers itself. It asks a [`Formula`] for the
//! signed value of an attack or spell and applies whatever comes back.

use crate::core::{BattleRng, Combatant};

use super::spell::{Spell, SpellKind};

/// Stat-based effect computation.
///
/// Returned values are signed: negative damages the target, positive heals.
pub trait Formula: Send + Sync {
    /// Value of a basic attack from `attacker` on `target`.
    fn attack(&self, attacker: &Combatant, target: &Combatant, rng: &mut BattleRng) -> i64;

    /// Value of `spell` cast by `caster` on `target`.
    fn spell(
        &self,
        caster: &Combatant,
        target: &Combatant,
        spell: &Spell,
        rng: &mut BattleRng,
    ) -> i64;
}

/// The default formula.
///
/// Attacks deal `strength * 2 + level - stamina / 2`, spells scale with
/// intellect (harm) or wisdom (mend). Resistances are percentages. A
/// `variance` percent random spread is applied to every value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardFormula {
    /// Random spread in percent (0 disables randomness).
    pub variance: u8,
}

impl Default for StandardFormula {
    fn default() -> Self {
        Self { variance: 10 }
    }
}

impl StandardFormula {
    fn spread(&self, base: i64, rng: &mut BattleRng) -> i64 {
        if self.variance == 0 || base == 0 {
            return base;
        }
        let swing = base * i64::from(self.variance) / 100;
        base + rng.gen_range(-swing..=swing)
    }

    fn resisted(amount: i64, resistance: i64) -> i64 {
        amount * (100 - resistance.clamp(0, 100)) / 100
    }
}

impl Formula for StandardFormula {
    fn attack(&self, attacker: &Combatant, target: &Combatant, rng: &mut BattleRng) -> i64 {
        let raw = attacker.attributes.strength * 2 + i64::from(attacker.level)
            - target.attributes.stamina / 2;
        let damage = Self::resisted(self.spread(raw.max(1), rng), target.resistances.physical);
        -damage.max(1)
    }

    fn spell(
        &self,
        caster: &Combatant,
        target: &Combatant,
        spell: &Spell,
        rng: &mut BattleRng,
    ) -> i64 {
        match spell.kind {
            SpellKind::Harm => {
                let raw = spell.power + caster.attributes.intellect;
                let rolled = self.spread(raw.max(1), rng);
                let damage = Self::resisted(rolled, target.resistances.magical);
                -damage.max(1)
            }
            SpellKind::Mend => self.spread(spell.power + caster.attributes.wisdom, rng).max(1),
        }
    }
}

/// Always yields the same values. Useful for scripted battles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedFormula {
    pub attack: i64,
    pub spell: i64,
}

impl FixedFormula {
    pub fn new(attack: i64) -> Self {
        Self { attack, spell: attack }
    }

    /// Set the spell value (builder pattern).
    #[must_use]
    pub fn with_spell(mut self, spell: i64) -> Self {
        self.spell = spell;
        self
    }
}

impl Formula for FixedFormula {
    fn attack(&self, _attacker: &Combatant, _target: &Combatant, _rng: &mut BattleRng) -> i64 {
        self.attack
    }

    fn spell(
        &self,
        _caster: &Combatant,
        _target: &Combatant,
        _spell: &Spell,
        _rng: &mut BattleRng,
    ) -> i64 {
        self.spell
    }
}
