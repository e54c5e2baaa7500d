//! Enchantment registry.
//!
//! The registry stores which enchantments are attached to which combatant
//! and answers "what fires for this combatant at this hook point?" when the
//! battle builds a round's event list.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::CombatantId;
use crate::effects::Enchantment;

/// Unique identifier for an attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub u32);

impl AttachmentId {
    /// Create a new attachment ID.
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

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Attachment({})", self.0)
    }
}

/// Where in a round an enchantment fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookTiming {
    /// Just before the bearer's own action. May suppress it.
    PreAttack,
    /// Just after each attack the bearer makes.
    PostAttack,
    /// Once after every action of the round.
    PostTurn,
}

/// An enchantment attached to a combatant.
#[derive(Clone, Debug)]
pub struct Attachment {
    pub id: AttachmentId,

    /// The combatant carrying the enchantment.
    pub bearer: CombatantId,

    pub enchantment: Arc<dyn Enchantment>,

    /// How many more times it can fire. `None` = until removed.
    pub uses_remaining: Option<u32>,
}

impl Attachment {
    /// Hook point of the underlying enchantment.
    #[must_use]
    pub fn timing(&self) -> HookTiming {
        self.enchantment.timing()
    }

    /// Check if this attachment has uses left.
    #[must_use]
    pub fn can_fire(&self) -> bool {
        self.uses_remaining.map_or(true, |u| u > 0)
    }

    /// Consume one use of this attachment.
    pub fn use_attachment(&mut self) {
        if let Some(ref mut uses) = self.uses_remaining {
            *uses = uses.saturating_sub(1);
        }
    }
}

/// Registry for enchantments, indexed by bearer.
#[derive(Clone, Debug, Default)]
pub struct EnchantmentRegistry {
    /// All attachments.
    attachments: FxHashMap<AttachmentId, Attachment>,

    /// Index by bearer for fast hook lookup.
    by_bearer: FxHashMap<CombatantId, Vec<AttachmentId>>,

    /// Next attachment ID to allocate.
    next_id: u32,
}

impl EnchantmentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an enchantment that lasts until removed.
    pub fn attach(
        &mut self,
        bearer: CombatantId,
        enchantment: Arc<dyn Enchantment>,
    ) -> AttachmentId {
        self.insert(bearer, enchantment, None)
    }

    /// Attach an enchantment that detaches itself after `uses` firings.
    pub fn attach_for(
        &mut self,
        bearer: CombatantId,
        enchantment: Arc<dyn Enchantment>,
        uses: u32,
    ) -> AttachmentId {
        self.insert(bearer, enchantment, Some(uses))
    }

    fn insert(
        &mut self,
        bearer: CombatantId,
        enchantment: Arc<dyn Enchantment>,
        uses_remaining: Option<u32>,
    ) -> AttachmentId {
        let id = AttachmentId::new(self.next_id);
        self.next_id += 1;

        tracing::debug!("Attaching {} to {} as {}", enchantment.name(), bearer, id);
        self.by_bearer.entry(bearer).or_default().push(id);
        self.attachments.insert(
            id,
            Attachment {
                id,
                bearer,
                enchantment,
                uses_remaining,
            },
        );
        id
    }

    /// Remove an attachment.
    pub fn detach(&mut self, id: AttachmentId) -> Option<Attachment> {
        let attachment = self.attachments.remove(&id)?;
        if let Some(list) = self.by_bearer.get_mut(&attachment.bearer) {
            list.retain(|&aid| aid != id);
            if list.is_empty() {
                self.by_bearer.remove(&attachment.bearer);
            }
        }
        Some(attachment)
    }

    /// Get an attachment by ID.
    #[must_use]
    pub fn get(&self, id: AttachmentId) -> Option<&Attachment> {
        self.attachments.get(&id)
    }

    /// Attachments on `bearer` that fire at `timing`, in attach order.
    pub fn hooks_for(&self, bearer: CombatantId, timing: HookTiming) -> Vec<&Attachment> {
        let Some(ids) = self.by_bearer.get(&bearer) else {
            return Vec::new();
        };
        let mut hooks: Vec<&Attachment> = ids
            .iter()
            .filter_map(|id| self.attachments.get(id))
            .filter(|a| a.can_fire() && a.timing() == timing)
            .collect();
        hooks.sort_by_key(|a| a.id);
        hooks
    }

    /// All attachments carried by `bearer`.
    pub fn attachments_for(&self, bearer: CombatantId) -> Vec<&Attachment> {
        self.by_bearer
            .get(&bearer)
            .map(|ids| ids.iter().filter_map(|id| self.attachments.get(id)).collect())
            .unwrap_or_default()
    }

    /// Record one firing. Limited attachments are detached when spent.
    ///
    /// Returns `true` if the attachment was detached.
    pub fn consume_use(&mut self, id: AttachmentId) -> bool {
        let spent = match self.attachments.get_mut(&id) {
            Some(attachment) => {
                attachment.use_attachment();
                attachment.uses_remaining == Some(0)
            }
            None => return false,
        };
        if spent {
            self.detach(id);
        }
        spent
    }

    /// Remove all attachments carried by a combatant.
    pub fn remove_for_bearer(&mut self, bearer: CombatantId) {
        let to_remove = self.by_bearer.remove(&bearer).unwrap_or_default();
        for id in to_remove {
            self.attachments.remove(&id);
        }
    }

    /// Get total attachment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Iterate all attachments.
    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.values()
    }
}
