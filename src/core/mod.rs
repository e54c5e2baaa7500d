//! Core battle types: combatants, parties, state, actions, RNG, configuration.
//!
//! This module contains the data the rest of the engine operates on.
//! Battles are configured via `BattleConfig` rather than modifying the core.

pub mod action;
pub mod combatant;
pub mod config;
pub mod entity;
pub mod party;
pub mod rng;
pub mod state;

pub use action::{ActionKind, ItemId, Orientation, PlannedAction, SpellId};
pub use combatant::{Attributes, Combatant, Resistances, Resource, Rewards};
pub use config::{BattleConfig, SchedulerKind};
pub use entity::{CombatantId, Side, SideMap};
pub use party::Party;
pub use rng::{BattleRng, BattleStreams};
pub use state::BattleState;
