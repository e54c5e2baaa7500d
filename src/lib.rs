//! # turn-combat
//!
//! A turn-based combat resolution engine for party-vs-enemies RPG battles.
//!
//! ## Design Principles
//!
//! 1. **One Writer**: Combatant resources change only while an event is
//!    being resolved. Input and enemy decisions describe intent; they never
//!    touch HP or MP.
//!
//! 2. **Single Flight**: Events resolve strictly one at a time, in the
//!    order the scheduler produced. Presentation pacing is an explicit
//!    `.await` between events, never a concurrent task.
//!
//! 3. **Injected Capabilities**: Formulas, enchantments, inventory, story
//!    flags, input and presentation are all passed in at construction.
//!    There is no global state.
//!
//! ## Round Flow
//!
//! - Each living party member picks an action (with the option to go back)
//! - Each living enemy picks an action
//! - The round is ordered once, enchantment hooks are laid out around it
//! - Events are popped and resolved until a side is defeated or the queue
//!   runs dry
//!
//! ## Modules
//!
//! - `core`: Combatants, parties, battle state, configuration, RNG
//! - `combat`: Combat events, results, and their resolution
//! - `effects`: Formulas, spells, and enchantments
//! - `triggers`: Enchantment attachments and hook timing
//! - `stack`: The round queue and turn schedulers
//! - `input`: Party input orchestration and enemy decisions
//! - `presentation`: Combat text sinks and battle notices
//! - `stores`: Inventory and story flag capabilities
//! - `battle`: The battle loop and its outcome
//! - `games`: Sample encounters

pub mod core;
pub mod combat;
pub mod effects;
pub mod triggers;
pub mod stack;
pub mod input;
pub mod presentation;
pub mod stores;
pub mod battle;
pub mod games;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    ActionKind, Attributes, BattleConfig, BattleRng, BattleState, BattleStreams, Combatant,
    CombatantId, ItemId, Orientation, Party, PlannedAction, Resource, Rewards, SchedulerKind, Side,
    SpellId,
};

pub use crate::combat::{
    BasicAction, CombatEvent, CombatResult, DropReason, EventId, EventKind, Resolution,
};

pub use crate::effects::{
    Enchantment, EnchantmentContext, EnchantmentOutcome, Formula, Grimoire, Spell, StandardFormula,
};

pub use crate::triggers::{AttachmentId, EnchantmentRegistry, HookTiming};

pub use crate::stack::{RoundQueue, TurnScheduler};

pub use crate::input::{EnemyPolicy, InputOrchestrator, InputRequest, MenuOption, Selection};

pub use crate::presentation::{BattleNotice, CombatText, PresentationSink};

pub use crate::stores::{FlagStore, Inventory, Satchel};

pub use crate::battle::{Battle, BattleBuilder, BattleOutcome, BattlePhase, BattleStats, Spoils};

pub use crate::error::{CombatError, Result};
