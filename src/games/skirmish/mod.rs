//! A small sample encounter for demos and tests.
//!
//! - Up to four party members (knight, mage, thief, cleric)
//! - Up to six enemies cycling through slimes, goblins and bats
//! - Fire and Cure in the grimoire, potions and an ether in the satchel
//! - Optionally, every enemy starts poisoned

mod roster;

pub use roster::{Skirmish, SkirmishBuilder, CURE, ETHER, FIRE, GOBLIN_DEFEATED, POTION};
