//! Inventory capability for items and gold.
//!
//! Party members declare item use during input collection, but items are
//! only consumed when the event resolves. To keep two members from planning
//! to drink the last potion, declaring a use *reserves* one copy. A
//! reservation is either consumed on resolution or released (retreat,
//! flight, suppressed or dropped actions, round end).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{ItemId, Resource};
use crate::error::{CombatError, Result};

/// Maximum stack size for any item.
pub const STACK_LIMIT: u32 = 99;

/// What a consumable does when used on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Restores HP.
    Restoration,
    /// Restores MP.
    ManaRecovery,
}

impl ItemEffect {
    #[must_use]
    pub fn resource(self) -> Resource {
        match self {
            ItemEffect::Restoration => Resource::Hp,
            ItemEffect::ManaRecovery => Resource::Mp,
        }
    }
}

/// An item definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub effect: ItemEffect,
    /// Amount restored.
    pub potency: i64,
}

impl ItemDef {
    pub fn new(id: ItemId, name: impl Into<String>, effect: ItemEffect, potency: i64) -> Self {
        Self {
            id,
            name: name.into(),
            effect,
            potency,
        }
    }
}

/// Item and gold storage injected into a battle.
pub trait Inventory: Send + Sync {
    /// Usable consumables with at least one unreserved copy, in a stable order.
    fn consumables(&self) -> Vec<(ItemDef, u32)>;

    /// Look up an item definition.
    fn definition(&self, item: ItemId) -> Option<ItemDef>;

    /// Copies not yet reserved.
    fn available(&self, item: ItemId) -> u32;

    /// Reserve one copy for a declared use.
    fn reserve(&mut self, item: ItemId) -> Result<()>;

    /// Give back one reserved copy.
    fn release(&mut self, item: ItemId);

    /// Give back every reservation.
    fn release_all(&mut self);

    /// Use up one reserved copy. Returns `false` if nothing was held.
    fn consume(&mut self, item: ItemId) -> bool;

    /// Add one copy. Returns `false` if the item is unknown or the stack is full.
    fn add_item(&mut self, item: ItemId) -> bool;

    fn add_gold(&mut self, gold: u64);

    fn gold(&self) -> u64;
}

#[derive(Clone, Debug)]
struct Stack {
    def: ItemDef,
    quantity: u32,
    pending: u32,
}

impl Stack {
    fn available(&self) -> u32 {
        self.quantity.saturating_sub(self.pending)
    }
}

/// The default in-memory inventory.
///
/// ## Example
///
/// ```
/// use turn_combat::core::ItemId;
/// use turn_combat::stores::{Inventory, ItemDef, ItemEffect, Satchel};
///
/// let potion = ItemDef::new(ItemId::new(1), "Potion", ItemEffect::Restoration, 20);
/// let mut satchel = Satchel::new().with_item(potion, 1);
///
/// satchel.reserve(ItemId::new(1)).unwrap();
/// assert_eq!(satchel.available(ItemId::new(1)), 0);
/// assert!(satchel.reserve(ItemId::new(1)).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Satchel {
    stacks: FxHashMap<ItemId, Stack>,
    /// Insertion order, for menu listing.
    order: Vec<ItemId>,
    gold: u64,
}

impl Satchel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack (builder pattern). Quantity is capped at the stack limit.
    #[must_use]
    pub fn with_item(mut self, def: ItemDef, quantity: u32) -> Self {
        let id = def.id;
        self.define(def);
        if let Some(stack) = self.stacks.get_mut(&id) {
            stack.quantity = quantity.min(STACK_LIMIT);
        }
        self
    }

    /// Start with some gold (builder pattern).
    #[must_use]
    pub fn with_gold(mut self, gold: u64) -> Self {
        self.gold = gold;
        self
    }

    /// Make an item known without holding any. Loot can only add known items.
    pub fn define(&mut self, def: ItemDef) {
        let id = def.id;
        match self.stacks.get_mut(&id) {
            Some(stack) => stack.def = def,
            None => {
                self.order.push(id);
                self.stacks.insert(
                    id,
                    Stack {
                        def,
                        quantity: 0,
                        pending: 0,
                    },
                );
            }
        }
    }

    /// Total copies held, reserved or not.
    #[must_use]
    pub fn quantity(&self, item: ItemId) -> u32 {
        self.stacks.get(&item).map_or(0, |s| s.quantity)
    }

    /// Copies currently reserved.
    #[must_use]
    pub fn pending(&self, item: ItemId) -> u32 {
        self.stacks.get(&item).map_or(0, |s| s.pending)
    }
}

impl Inventory for Satchel {
    fn consumables(&self) -> Vec<(ItemDef, u32)> {
        self.order
            .iter()
            .filter_map(|id| self.stacks.get(id))
            .filter(|s| s.available() > 0)
            .map(|s| (s.def.clone(), s.available()))
            .collect()
    }

    fn definition(&self, item: ItemId) -> Option<ItemDef> {
        self.stacks.get(&item).map(|s| s.def.clone())
    }

    fn available(&self, item: ItemId) -> u32 {
        self.stacks.get(&item).map_or(0, Stack::available)
    }

    fn reserve(&mut self, item: ItemId) -> Result<()> {
        match self.stacks.get_mut(&item) {
            Some(stack) if stack.available() > 0 => {
                stack.pending += 1;
                Ok(())
            }
            _ => Err(CombatError::ItemUnavailable { item }),
        }
    }

    fn release(&mut self, item: ItemId) {
        if let Some(stack) = self.stacks.get_mut(&item) {
            stack.pending = stack.pending.saturating_sub(1);
        }
    }

    fn release_all(&mut self) {
        for stack in self.stacks.values_mut() {
            stack.pending = 0;
        }
    }

    fn consume(&mut self, item: ItemId) -> bool {
        match self.stacks.get_mut(&item) {
            Some(stack) if stack.pending > 0 && stack.quantity > 0 => {
                stack.pending -= 1;
                stack.quantity -= 1;
                true
            }
            _ => false,
        }
    }

    fn add_item(&mut self, item: ItemId) -> bool {
        match self.stacks.get_mut(&item) {
            Some(stack) if stack.quantity < STACK_LIMIT => {
                stack.quantity += 1;
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!("Cannot add unknown {}", item);
                false
            }
        }
    }

    fn add_gold(&mut self, gold: u64) {
        self.gold = self.gold.saturating_add(gold);
    }

    fn gold(&self) -> u64 {
        self.gold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POTION: ItemId = ItemId(1);
    const ETHER: ItemId = ItemId(2);

    fn satchel() -> Satchel {
        Satchel::new()
            .with_item(ItemDef::new(POTION, "Potion", ItemEffect::Restoration, 20), 2)
            .with_item(ItemDef::new(ETHER, "Ether", ItemEffect::ManaRecovery, 10), 1)
    }

    #[test]
    fn test_reservation_limits_available() {
        let mut satchel = satchel();
        satchel.reserve(POTION).unwrap();
        satchel.reserve(POTION).unwrap();

        assert_eq!(satchel.available(POTION), 0);
        assert_eq!(satchel.quantity(POTION), 2);
        assert_eq!(
            satchel.reserve(POTION),
            Err(CombatError::ItemUnavailable { item: POTION })
        );
    }

    #[test]
    fn test_release_and_consume() {
        let mut satchel = satchel();
        satchel.reserve(POTION).unwrap();
        satchel.reserve(ETHER).unwrap();

        satchel.release(ETHER);
        assert_eq!(satchel.available(ETHER), 1);

        assert!(satchel.consume(POTION));
        assert_eq!(satchel.quantity(POTION), 1);
        assert_eq!(satchel.pending(POTION), 0);

        // Nothing reserved, nothing consumed
        assert!(!satchel.consume(POTION));
        assert_eq!(satchel.quantity(POTION), 1);
    }

    #[test]
    fn test_release_all() {
        let mut satchel = satchel();
        satchel.reserve(POTION).unwrap();
        satchel.reserve(ETHER).unwrap();
        satchel.release_all();
        assert_eq!(satchel.available(POTION), 2);
        assert_eq!(satchel.available(ETHER), 1);
    }

    #[test]
    fn test_consumables_listing() {
        let mut satchel = satchel();
        let names: Vec<_> = satchel
            .consumables()
            .into_iter()
            .map(|(d, n)| format!("{} x{}", d.name, n))
            .collect();
        assert_eq!(names, vec!["Potion x2", "Ether x1"]);

        satchel.reserve(ETHER).unwrap();
        assert_eq!(satchel.consumables().len(), 1);
    }

    #[test]
    fn test_stack_limit() {
        let potion = ItemDef::new(POTION, "Potion", ItemEffect::Restoration, 20);
        let mut satchel = Satchel::new().with_item(potion, 500);
        assert_eq!(satchel.quantity(POTION), STACK_LIMIT);
        assert!(!satchel.add_item(POTION));
    }

    #[test]
    fn test_add_known_and_unknown() {
        let mut satchel = Satchel::new();
        satchel.define(ItemDef::new(ETHER, "Ether", ItemEffect::ManaRecovery, 10));
        assert!(satchel.add_item(ETHER));
        assert_eq!(satchel.quantity(ETHER), 1);
        assert!(!satchel.add_item(ItemId::new(77)));
    }

    #[test]
    fn test_gold() {
        let mut satchel = Satchel::new().with_gold(5);
        satchel.add_gold(10);
        assert_eq!(satchel.gold(), 15);
    }
}
