//! The top-level battle: construction, the round loop, and its outcome.
//!
//! ## Example Usage
//!
//! ```
//! use turn_combat::battle::{Battle, BattleOutcome};
//! use turn_combat::core::{BattleConfig, Combatant, CombatantId};
//! use turn_combat::effects::FixedFormula;
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_time()
//!     .build()
//!     .unwrap();
//!
//! let mut battle = Battle::builder(
//!     vec![Combatant::new(CombatantId::new(1), "Hero").with_hp(20).with_dexterity(5)],
//!     vec![Combatant::new(CombatantId::new(2), "Slime").with_hp(10).with_dexterity(2)],
//! )
//! .with_config(BattleConfig::instant())
//! .with_formula(FixedFormula::new(-10))
//! .build()
//! .unwrap();
//!
//! let outcome = runtime.block_on(battle.run()).unwrap();
//! assert!(matches!(outcome, BattleOutcome::Won(_)));
//! ```

mod engine;
mod outcome;

pub use engine::{Battle, BattleBuilder, BattlePhase, BattleStats};
pub use outcome::{BattleOutcome, Spoils};
