//! Spell definitions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::SpellId;

/// Whether a spell hurts or helps its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellKind {
    Harm,
    Mend,
}

/// A castable spell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub id: SpellId,
    pub name: String,
    /// MP spent when the spell resolves.
    pub mp_cost: i64,
    pub power: i64,
    pub kind: SpellKind,
}

impl Spell {
    pub fn new(
        id: SpellId,
        name: impl Into<String>,
        mp_cost: i64,
        power: i64,
        kind: SpellKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            mp_cost,
            power,
            kind,
        }
    }

    /// Does this spell target the caster's own side?
    #[must_use]
    pub fn targets_allies(&self) -> bool {
        self.kind == SpellKind::Mend
    }
}

/// All spells known to a battle, by id.
#[derive(Clone, Debug, Default)]
pub struct Grimoire {
    spells: FxHashMap<SpellId, Spell>,
}

impl Grimoire {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spell (builder pattern).
    #[must_use]
    pub fn with(mut self, spell: Spell) -> Self {
        self.insert(spell);
        self
    }

    /// Add or replace a spell.
    pub fn insert(&mut self, spell: Spell) {
        self.spells.insert(spell.id, spell);
    }

    #[must_use]
    pub fn get(&self, id: SpellId) -> Option<&Spell> {
        self.spells.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}
