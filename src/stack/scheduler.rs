//! Turn ordering for one round.
//!
//! The round queue is consumed from the end, so a scheduler returns events
//! with the one that should resolve *first* last.

use crate::combat::CombatEvent;
use crate::core::{BattleState, SchedulerKind};

/// Orders one round's declared actions.
pub trait TurnScheduler: Send + Sync {
    /// Reorder `events`. The result must be a permutation of the input.
    fn order(&self, events: Vec<CombatEvent>, state: &BattleState) -> Vec<CombatEvent>;
}

fn dexterity(state: &BattleState, id: crate::core::CombatantId) -> i64 {
    state.combatant(id).map_or(0, |c| c.attributes.dexterity)
}

/// `executor.dexterity - target.dexterity` for an event.
///
/// Untargeted events compare the executor with itself, giving 0.
#[must_use]
pub fn relative_dexterity(event: &CombatEvent, state: &BattleState) -> i64 {
    dexterity(state, event.executor()) - dexterity(state, event.subject())
}

/// Ascending stable sort by [`relative_dexterity`].
///
/// Popping from the end resolves the largest advantage over the event's own
/// target first. Among equal values the later-declared event pops first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelativeDexterity;

impl TurnScheduler for RelativeDexterity {
    fn order(&self, mut events: Vec<CombatEvent>, state: &BattleState) -> Vec<CombatEvent> {
        events.sort_by_cached_key(|e| relative_dexterity(e, state));
        events
    }
}

/// Conventional speed order: the highest executor dexterity acts first.
///
/// Among equal dexterity the earlier-declared event acts first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FastestFirst;

impl TurnScheduler for FastestFirst {
    fn order(&self, events: Vec<CombatEvent>, state: &BattleState) -> Vec<CombatEvent> {
        let mut indexed: Vec<(usize, CombatEvent)> = events.into_iter().enumerate().collect();
        indexed.sort_by_cached_key(|(i, e)| {
            (dexterity(state, e.executor()), std::cmp::Reverse(*i))
        });
        indexed.into_iter().map(|(_, e)| e).collect()
    }
}

/// Build the scheduler a configuration asks for.
#[must_use]
pub fn scheduler_for(kind: SchedulerKind) -> Box<dyn TurnScheduler> {
    match kind {
        SchedulerKind::RelativeDexterity => Box::new(RelativeDexterity),
        SchedulerKind::FastestFirst => Box::new(FastestFirst),
    }
}
