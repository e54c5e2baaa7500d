//! Effect capabilities: formulas, spells, and enchantments.
//!
//! - `Formula`: computes the signed value of attacks and spells
//! - `Spell` / `Grimoire`: castable spell definitions
//! - `Enchantment`: status effects fired at hook points
//!
//! ## Design Philosophy
//!
//! Capabilities compute, the battle applies. Nothing in this module
//! mutates a combatant. A formula returns a number and an enchantment
//! returns an outcome; the battle clamps and applies them while resolving
//! the owning event.

mod enchantment;
mod formula;
mod spell;

pub use enchantment::{
    ElementalStrike, Enchantment, EnchantmentContext, EnchantmentError, EnchantmentOutcome,
    LifeDrain, Miasma, Paralysis, Periodic,
};
pub use formula::{FixedFormula, Formula, StandardFormula};
pub use spell::{Grimoire, Spell, SpellKind};
