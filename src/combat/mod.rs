//! Combat events and their resolution.
//!
//! ## Key Components
//!
//! - [`CombatEvent`]: one queued action or enchantment hook
//! - [`EventKind`]: the tag resolution dispatches on
//! - [`CombatResult`]: the signed outcome of an event on one combatant
//! - [`EventResolver`]: applies an event to the battle state
//!
//! ## Event Kinds
//!
//! | Kind         | Executor | Target          | Effect                          |
//! |--------------|----------|-----------------|---------------------------------|
//! | `Basic`      | actor    | chosen target   | attack, defend, item, spell     |
//! | `PreAttack`  | bearer   | none            | may cancel the paired action    |
//! | `PostAttack` | bearer   | attack target   | follow-up after a landed attack |
//! | `PostTurn`   | bearer   | none            | end-of-round effect             |

mod event;
mod resolve;
mod result;

pub use event::{BasicAction, CombatEvent, EventId, EventKind, EventStatus};
pub use resolve::{orientation_for, Applied, DropReason, EventResolver, Resolution, ResolverContext};
pub use result::{CombatResult, CombatResults};
