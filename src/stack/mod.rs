//! Round scheduling and the queue it fills.
//!
//! A round's declared actions are collected into a [`RoundQueue`], ordered
//! once by a [`TurnScheduler`], and then resolved strictly one at a time by
//! popping from the end.
//!
//! ## Example Usage
//!
//! ```
//! use turn_combat::combat::CombatEvent;
//! use turn_combat::core::{BattleState, Combatant, CombatantId};
//! use turn_combat::stack::{RelativeDexterity, TurnScheduler};
//!
//! let state = BattleState::new(
//!     vec![Combatant::new(CombatantId::new(1), "Rogue").with_hp(10).with_dexterity(5)],
//!     vec![Combatant::new(CombatantId::new(2), "Imp").with_hp(10).with_dexterity(2)],
//! )
//! .unwrap();
//!
//! let ordered: Vec<CombatEvent> = RelativeDexterity.order(Vec::new(), &state);
//! assert!(ordered.is_empty());
//! ```

mod queue;
mod scheduler;

pub use queue::RoundQueue;
pub use scheduler::{
    relative_dexterity, scheduler_for, FastestFirst, RelativeDexterity, TurnScheduler,
};
