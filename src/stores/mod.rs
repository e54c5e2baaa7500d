//! Capabilities the battle borrows from the wider game.
//!
//! The battle never reaches for global state. The caller injects an
//! [`Inventory`] (items and gold) and a [`FlagStore`] (story flags) at
//! construction, and reads them back when the battle is over.

mod flags;
mod inventory;

pub use flags::{FlagSet, FlagStore};
pub use inventory::{Inventory, ItemDef, ItemEffect, Satchel, STACK_LIMIT};
