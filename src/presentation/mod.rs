//! Presentation boundary.
//!
//! The engine never draws anything. It hands combat text to a
//! [`PresentationSink`] and awaits completion, and it publishes
//! [`BattleNotice`]s on a [`NoticeBus`] for anyone watching.

mod notice;
mod sink;
mod text;

pub use notice::{BattleNotice, NoticeBus};
pub use sink::{LogSink, NullSink, PresentationError, PresentationSink, TranscriptSink};
pub use text::{CombatText, TextColor};
