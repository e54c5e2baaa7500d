//! The round queue.
//!
//! Events are stored bottom to top and consumed by popping from the end.
//! The queue also remembers every event it has resolved, so a replayed
//! event is caught before it can apply twice.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::combat::{CombatEvent, EventId, EventStatus};
use crate::core::CombatantId;
use crate::error::{CombatError, Result};

#[derive(Clone, Debug, Default)]
pub struct RoundQueue {
    /// Pending events (index 0 = bottom, last = next to resolve).
    events: Vec<CombatEvent>,

    /// Lifecycle of every event seen this battle.
    statuses: FxHashMap<EventId, EventStatus>,

    /// Main actions cancelled by a pre-attack hook this round.
    suppressed: FxHashSet<EventId>,
}

impl RoundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event on top.
    pub fn push(&mut self, event: CombatEvent) {
        self.statuses.insert(event.id(), EventStatus::Pending);
        self.events.push(event);
    }

    /// Remove the most recently queued event declared by `executor`.
    ///
    /// Used when input collection goes back to a previous member.
    pub fn pop_for(&mut self, executor: CombatantId) -> Option<CombatEvent> {
        let index = self.events.iter().rposition(|e| e.executor() == executor)?;
        let event = self.events.remove(index);
        self.statuses.remove(&event.id());
        Some(event)
    }

    /// Take every pending event out, bottom first.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the pending events with an already-ordered list (bottom first).
    pub fn load(&mut self, events: Vec<CombatEvent>) {
        for event in &events {
            self.statuses.entry(event.id()).or_insert(EventStatus::Pending);
        }
        self.events = events;
    }

    /// Pop the next event to resolve.
    pub fn pop_next(&mut self) -> Option<CombatEvent> {
        self.events.pop()
    }

    #[must_use]
    pub fn peek_next(&self) -> Option<&CombatEvent> {
        self.events.last()
    }

    /// Pending events, bottom first.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Pending events in the order they will resolve.
    pub fn resolution_order(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter().rev()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // === Lifecycle ===

    #[must_use]
    pub fn status(&self, id: EventId) -> Option<EventStatus> {
        self.statuses.get(&id).copied()
    }

    #[must_use]
    pub fn is_resolved(&self, id: EventId) -> bool {
        self.status(id) == Some(EventStatus::Resolved)
    }

    /// Move an event into its presentation delay.
    pub fn mark_animating(&mut self, id: EventId) -> Result<()> {
        if self.is_resolved(id) {
            return Err(CombatError::AlreadyResolvedEvent(id));
        }
        self.statuses.insert(id, EventStatus::Animating);
        Ok(())
    }

    /// Record that an event has resolved. Resolving twice is an error.
    pub fn mark_resolved(&mut self, id: EventId) -> Result<()> {
        if self.is_resolved(id) {
            return Err(CombatError::AlreadyResolvedEvent(id));
        }
        self.statuses.insert(id, EventStatus::Resolved);
        Ok(())
    }

    // === Suppression ===

    /// Cancel a main action for this round.
    pub fn suppress(&mut self, id: EventId) {
        self.suppressed.insert(id);
    }

    #[must_use]
    pub fn is_suppressed(&self, id: EventId) -> bool {
        self.suppressed.contains(&id)
    }

    /// Forget per-round suppression. Resolved history is kept for the battle.
    pub fn end_round(&mut self) {
        self.suppressed.clear();
    }

    /// Drop everything still pending and return it.
    pub fn clear(&mut self) -> Vec<CombatEvent> {
        let dropped = self.drain();
        for event in &dropped {
            if self.status(event.id()) == Some(EventStatus::Pending) {
                self.statuses.remove(&event.id());
            }
        }
        self.suppressed.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{BasicAction, EventKind};
    use crate::core::Orientation;

    fn event(id: u64, executor: u32) -> CombatEvent {
        CombatEvent::new(
            EventId::new(id),
            CombatantId::new(executor),
            Some(CombatantId::new(99)),
            Orientation::Left,
            EventKind::Basic(BasicAction::Attack),
        )
    }

    #[test]
    fn test_pops_from_end() {
        let mut queue = RoundQueue::new();
        queue.push(event(1, 1));
        queue.push(event(2, 2));

        assert_eq!(queue.peek_next().map(CombatEvent::id), Some(EventId::new(2)));
        assert_eq!(queue.pop_next().map(|e| e.id()), Some(EventId::new(2)));
        assert_eq!(queue.pop_next().map(|e| e.id()), Some(EventId::new(1)));
        assert!(queue.pop_next().is_none());
    }

    #[test]
    fn test_pop_for_executor() {
        let mut queue = RoundQueue::new();
        queue.push(event(1, 1));
        queue.push(event(2, 2));

        let popped = queue.pop_for(CombatantId::new(1)).unwrap();
        assert_eq!(popped.id(), EventId::new(1));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.status(EventId::new(1)), None);
        assert!(queue.pop_for(CombatantId::new(1)).is_none());
    }

    #[test]
    fn test_resolution_order() {
        let mut queue = RoundQueue::new();
        queue.load(vec![event(1, 1), event(2, 2), event(3, 3)]);
        let order: Vec<u64> = queue.resolution_order().map(|e| e.id().raw()).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_double_resolve_rejected() {
        let mut queue = RoundQueue::new();
        queue.push(event(1, 1));
        let id = EventId::new(1);

        queue.mark_animating(id).unwrap();
        assert_eq!(queue.status(id), Some(EventStatus::Animating));
        queue.mark_resolved(id).unwrap();

        assert_eq!(queue.mark_resolved(id), Err(CombatError::AlreadyResolvedEvent(id)));
        assert_eq!(queue.mark_animating(id), Err(CombatError::AlreadyResolvedEvent(id)));
    }

    #[test]
    fn test_suppression_is_per_round() {
        let mut queue = RoundQueue::new();
        queue.suppress(EventId::new(4));
        assert!(queue.is_suppressed(EventId::new(4)));
        queue.end_round();
        assert!(!queue.is_suppressed(EventId::new(4)));
    }

    #[test]
    fn test_clear_returns_pending() {
        let mut queue = RoundQueue::new();
        queue.push(event(1, 1));
        queue.push(event(2, 2));
        let dropped = queue.clear();
        assert_eq!(dropped.len(), 2);
        assert!(queue.is_empty());
    }
}
