//! Enchantments: pluggable status effects.
//!
//! An enchantment is pure: it inspects the combatants it is handed and
//! returns an [`EnchantmentOutcome`] describing what should happen. The
//! battle applies the outcome during event resolution, so resources are
//! only ever mutated in one place.
//!
//! ## Hook contracts
//!
//! | Timing       | `enchanted` | `other`      | rosters                  |
//! |--------------|-------------|--------------|--------------------------|
//! | `PreAttack`  | executor    | `None`       | `None`                   |
//! | `PostAttack` | attacker    | attack target| attacker's and target's  |
//! | `PostTurn`   | bearer      | `None`       | bearer's own roster      |

use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::core::{Combatant, CombatantId, Party, Resource};
use crate::presentation::TextColor;
use crate::triggers::HookTiming;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnchantmentError {
    #[error("{enchantment} needs {what} but it was not provided")]
    MissingContext {
        enchantment: String,
        what: &'static str,
    },

    #[error("{enchantment} failed: {reason}")]
    Failed { enchantment: String, reason: String },
}

/// Everything an enchantment may look at when it applies.
#[derive(Clone, Copy, Debug)]
pub struct EnchantmentContext<'a> {
    /// The combatant carrying the enchantment.
    pub enchanted: &'a Combatant,
    /// The attack target for post-attack hooks.
    pub other: Option<&'a Combatant>,
    /// The enchanted combatant's full roster.
    pub allies: Option<&'a Party>,
    /// The opposing full roster.
    pub opponents: Option<&'a Party>,
    /// Signed value of the paired main attack, for post-attack hooks.
    pub main_result: Option<i64>,
}

impl<'a> EnchantmentContext<'a> {
    /// Context carrying only the enchanted combatant.
    pub fn solo(enchanted: &'a Combatant) -> Self {
        Self {
            enchanted,
            other: None,
            allies: None,
            opponents: None,
            main_result: None,
        }
    }
}

/// What an enchantment wants to happen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnchantmentOutcome {
    /// Signed change applied to `resource` of every affected combatant.
    pub value: i64,
    pub resource: Resource,
    pub color: TextColor,
    /// Combatants that receive `value`.
    pub affected: SmallVec<[CombatantId; 4]>,
    /// Cancel the enchanted combatant's main action this round.
    pub suppress: bool,
    /// Text shown instead of the bare value.
    pub label: Option<String>,
}

impl EnchantmentOutcome {
    /// An HP change on the given combatants.
    pub fn hp(value: i64, affected: impl IntoIterator<Item = CombatantId>) -> Self {
        Self {
            value,
            resource: Resource::Hp,
            color: TextColor::for_value(value),
            affected: affected.into_iter().collect(),
            suppress: false,
            label: None,
        }
    }

    /// Nothing happens.
    pub fn nothing() -> Self {
        Self::hp(0, [])
    }

    /// The enchanted combatant loses its action.
    pub fn suppress(enchanted: CombatantId, label: impl Into<String>) -> Self {
        Self {
            value: 0,
            resource: Resource::Hp,
            color: TextColor::Yellow,
            affected: smallvec![enchanted],
            suppress: true,
            label: Some(label.into()),
        }
    }

    /// Set the resource (builder pattern).
    #[must_use]
    pub fn on(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self
    }

    /// Set the color (builder pattern).
    #[must_use]
    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = color;
        self
    }
}

/// A status effect attached to a combatant.
pub trait Enchantment: Send + Sync + std::fmt::Debug {
    /// Human-readable name (for logs and combat text).
    fn name(&self) -> &str;

    /// Which hook point this enchantment fires at.
    fn timing(&self) -> HookTiming;

    /// Compute the effect. Errors are recovered by the battle as "no effect".
    fn apply(&self, ctx: &EnchantmentContext<'_>) -> Result<EnchantmentOutcome, EnchantmentError>;
}

// =============================================================================
// Built-in enchantments
// =============================================================================

/// Regeneration (positive) or poison (negative), once per round end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Periodic {
    pub name: String,
    pub amount: i64,
}

impl Periodic {
    pub fn regen(amount: i64) -> Self {
        Self {
            name: "Regen".to_string(),
            amount: amount.abs(),
        }
    }

    pub fn poison(amount: i64) -> Self {
        Self {
            name: "Poison".to_string(),
            amount: -amount.abs(),
        }
    }
}

impl Enchantment for Periodic {
    fn name(&self) -> &str {
        &self.name
    }

    fn timing(&self) -> HookTiming {
        HookTiming::PostTurn
    }

    fn apply(&self, ctx: &EnchantmentContext<'_>) -> Result<EnchantmentOutcome, EnchantmentError> {
        let outcome = EnchantmentOutcome::hp(self.amount, [ctx.enchanted.id()]);
        if self.amount < 0 {
            Ok(outcome.with_color(TextColor::Purple))
        } else {
            Ok(outcome)
        }
    }
}

/// The bearer cannot act while this lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Paralysis;

impl Enchantment for Paralysis {
    fn name(&self) -> &str {
        "Paralysis"
    }

    fn timing(&self) -> HookTiming {
        HookTiming::PreAttack
    }

    fn apply(&self, ctx: &EnchantmentContext<'_>) -> Result<EnchantmentOutcome, EnchantmentError> {
        Ok(EnchantmentOutcome::suppress(ctx.enchanted.id(), "Paralyzed"))
    }
}

/// Extra elemental damage on every attack, reduced by magical resistance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementalStrike {
    pub element: String,
    pub power: i64,
}

impl ElementalStrike {
    pub fn new(element: impl Into<String>, power: i64) -> Self {
        Self {
            element: element.into(),
            power,
        }
    }
}

impl Enchantment for ElementalStrike {
    fn name(&self) -> &str {
        &self.element
    }

    fn timing(&self) -> HookTiming {
        HookTiming::PostAttack
    }

    fn apply(&self, ctx: &EnchantmentContext<'_>) -> Result<EnchantmentOutcome, EnchantmentError> {
        let target = ctx.other.ok_or_else(|| EnchantmentError::MissingContext {
            enchantment: self.element.clone(),
            what: "an attack target",
        })?;
        if target.is_down() {
            return Ok(EnchantmentOutcome::nothing());
        }
        let resist = target.resistances.magical.clamp(0, 100);
        let damage = self.power.max(0) * (100 - resist) / 100;
        Ok(EnchantmentOutcome::hp(-damage, [target.id()]))
    }
}

/// Heals the attacker by a percentage of the damage its attack dealt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifeDrain {
    pub percent: i64,
}

impl Enchantment for LifeDrain {
    fn name(&self) -> &str {
        "Life Drain"
    }

    fn timing(&self) -> HookTiming {
        HookTiming::PostAttack
    }

    fn apply(&self, ctx: &EnchantmentContext<'_>) -> Result<EnchantmentOutcome, EnchantmentError> {
        let dealt = ctx.main_result.ok_or_else(|| EnchantmentError::MissingContext {
            enchantment: self.name().to_string(),
            what: "the attack result",
        })?;
        if dealt >= 0 {
            return Ok(EnchantmentOutcome::nothing());
        }
        let healed = (-dealt) * self.percent.max(0) / 100;
        Ok(EnchantmentOutcome::hp(healed, [ctx.enchanted.id()]).with_color(TextColor::Purple))
    }
}

/// Every attack also splashes all living opponents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Miasma {
    pub amount: i64,
}

impl Enchantment for Miasma {
    fn name(&self) -> &str {
        "Miasma"
    }

    fn timing(&self) -> HookTiming {
        HookTiming::PostAttack
    }

    fn apply(&self, ctx: &EnchantmentContext<'_>) -> Result<EnchantmentOutcome, EnchantmentError> {
        let opponents = ctx.opponents.ok_or_else(|| EnchantmentError::MissingContext {
            enchantment: self.name().to_string(),
            what: "the opposing roster",
        })?;
        let affected: Vec<CombatantId> = opponents
            .living()
            .filter(|m| !m.is_down())
            .map(Combatant::id)
            .collect();
        Ok(EnchantmentOutcome::hp(-self.amount.abs(), affected).with_color(TextColor::Purple))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;

    fn hero() -> Combatant {
        Combatant::new(CombatantId::new(1), "Hero").with_hp(20)
    }

    fn goblin() -> Combatant {
        Combatant::new(CombatantId::new(2), "Goblin")
            .with_hp(10)
            .with_resistances(0, 50)
    }

    #[test]
    fn test_periodic() {
        let hero = hero();
        let ctx = EnchantmentContext::solo(&hero);

        let regen = Periodic::regen(3).apply(&ctx).unwrap();
        assert_eq!(regen.value, 3);
        assert_eq!(regen.color, TextColor::Green);
        assert_eq!(regen.affected.as_slice(), &[hero.id()]);

        let poison = Periodic::poison(5).apply(&ctx).unwrap();
        assert_eq!(poison.value, -5);
        assert_eq!(poison.color, TextColor::Purple);
        assert_eq!(Periodic::poison(5).timing(), HookTiming::PostTurn);
    }

    #[test]
    fn test_paralysis_suppresses() {
        let hero = hero();
        let outcome = Paralysis.apply(&EnchantmentContext::solo(&hero)).unwrap();
        assert!(outcome.suppress);
        assert_eq!(outcome.value, 0);
        assert_eq!(outcome.label.as_deref(), Some("Paralyzed"));
    }

    #[test]
    fn test_elemental_strike_respects_resistance() {
        let hero = hero();
        let goblin = goblin();
        let ctx = EnchantmentContext {
            other: Some(&goblin),
            ..EnchantmentContext::solo(&hero)
        };
        let outcome = ElementalStrike::new("Fire", 8).apply(&ctx).unwrap();
        assert_eq!(outcome.value, -4);
        assert_eq!(outcome.affected.as_slice(), &[goblin.id()]);
    }

    #[test]
    fn test_elemental_strike_without_target_fails() {
        let hero = hero();
        let err = ElementalStrike::new("Ice", 4)
            .apply(&EnchantmentContext::solo(&hero))
            .unwrap_err();
        assert!(matches!(err, EnchantmentError::MissingContext { .. }));
    }

    #[test]
    fn test_life_drain() {
        let hero = hero();
        let ctx = EnchantmentContext {
            main_result: Some(-10),
            ..EnchantmentContext::solo(&hero)
        };
        let outcome = LifeDrain { percent: 50 }.apply(&ctx).unwrap();
        assert_eq!(outcome.value, 5);
        assert_eq!(outcome.affected.as_slice(), &[hero.id()]);

        let missed = EnchantmentContext {
            main_result: Some(0),
            ..EnchantmentContext::solo(&hero)
        };
        assert_eq!(LifeDrain { percent: 50 }.apply(&missed).unwrap().value, 0);
    }

    #[test]
    fn test_miasma_hits_living_opponents() {
        let hero = hero();
        let foes = Party::new(
            Side::Enemies,
            vec![goblin(), Combatant::new(CombatantId::new(3), "Rat").with_hp(3)],
        );
        let ctx = EnchantmentContext {
            opponents: Some(&foes),
            ..EnchantmentContext::solo(&hero)
        };
        let outcome = Miasma { amount: 2 }.apply(&ctx).unwrap();
        assert_eq!(outcome.value, -2);
        assert_eq!(outcome.affected.len(), 2);
    }
}
