//! Where round decisions come from.
//!
//! - [`InputOrchestrator`]: the party's decisions, one member at a time
//! - [`EnemyPolicy`]: one decision per living enemy
//!
//! Neither side touches combatant resources. They only describe intent;
//! the battle validates it and queues events.

mod enemy;
mod orchestrator;

pub use enemy::{default_policy, EnemyPolicy, FirstLivingTarget, RandomTarget};
pub use orchestrator::{
    build_menu, AutoPilot, InputCursor, InputOrchestrator, InputRequest, MenuOption, ScriptedInput,
    Selection,
};
