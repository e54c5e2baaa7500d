//! Hook points for enchantments.
//!
//! Enchantments attach to a combatant and fire at one of three points in
//! a round:
//!
//! - [`HookTiming::PreAttack`]: immediately before the bearer acts
//! - [`HookTiming::PostAttack`]: immediately after each attack the bearer makes
//! - [`HookTiming::PostTurn`]: after every action of the round has resolved
//!
//! The [`EnchantmentRegistry`] records the attachments. The battle asks it
//! for hooks while laying out the round, so every hook becomes an ordinary
//! queued event with its own id.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use turn_combat::core::CombatantId;
//! use turn_combat::effects::Periodic;
//! use turn_combat::triggers::{EnchantmentRegistry, HookTiming};
//!
//! let mut registry = EnchantmentRegistry::new();
//! let hero = CombatantId::new(1);
//! registry.attach(hero, Arc::new(Periodic::regen(3)));
//!
//! assert_eq!(registry.hooks_for(hero, HookTiming::PostTurn).len(), 1);
//! assert!(registry.hooks_for(hero, HookTiming::PreAttack).is_empty());
//! ```

mod registry;

pub use registry::{Attachment, AttachmentId, EnchantmentRegistry, HookTiming};
