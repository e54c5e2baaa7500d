//! Sample encounters built on the engine.

pub mod skirmish;
