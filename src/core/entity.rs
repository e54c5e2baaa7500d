//! Combatant identification and per-side storage.
//!
//! ## CombatantId
//!
//! Every battle participant has a unique `CombatantId`. Ids are assigned by
//! the roster owner and must be unique across both sides of one battle.
//!
//! ## Side / SideMap
//!
//! A battle always has exactly two sides: the player's party and the enemy
//! party. `SideMap<T>` stores one value per side with O(1) access.
//!
//! ```
//! use turn_combat::core::{Side, SideMap};
//!
//! let mut kills: SideMap<u32> = SideMap::with_value(0);
//! kills[Side::Party] += 2;
//!
//! assert_eq!(kills[Side::Party], 2);
//! assert_eq!(kills[Side::Enemies], 0);
//! assert_eq!(Side::Party.opponent(), Side::Enemies);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Unique identifier for a battle participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// Create a new combatant ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for CombatantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Combatant({})", self.0)
    }
}

/// One of the two sides of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player-controlled party.
    Party,
    /// The enemy group.
    Enemies,
}

impl Side {
    /// Both sides, party first.
    pub const ALL: [Side; 2] = [Side::Party, Side::Enemies];

    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::Party => Side::Enemies,
            Side::Enemies => Side::Party,
        }
    }

    /// Storage index for this side.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::Party => 0,
            Side::Enemies => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Party => write!(f, "party"),
            Side::Enemies => write!(f, "enemies"),
        }
    }
}

/// Per-side data storage with O(1) access.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a new SideMap with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            data: [factory(Side::Party), factory(Side::Enemies)],
        }
    }

    /// Create from explicit party and enemy values.
    pub fn from_parts(party: T, enemies: T) -> Self {
        Self {
            data: [party, enemies],
        }
    }

    /// Create a new SideMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        &self.data[side.index()]
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Iterate over (Side, &T) pairs, party first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::ALL.into_iter().zip(self.data.iter())
    }

    /// Iterate over (Side, &mut T) pairs, party first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Side, &mut T)> {
        Side::ALL.into_iter().zip(self.data.iter_mut())
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}
