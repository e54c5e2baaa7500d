//! Battle configuration.
//!
//! Callers configure pacing, scheduling, and randomness at construction.
//! Every field has a default, so a partial JSON document is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which turn scheduler orders a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Sort ascending by `executor.dexterity - target.dexterity`, pop from
    /// the end. The classic ordering of this engine.
    #[default]
    RelativeDexterity,
    /// Fastest executor acts first, regardless of target.
    FastestFirst,
}

/// Configuration for one battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for all battle randomness (damage variance, enemy targeting, loot).
    pub seed: u64,

    /// Cosmetic delay while an event is animating, in milliseconds.
    pub animation_delay_ms: u64,

    /// Settle delay after each confirmed party input, in milliseconds.
    pub input_delay_ms: u64,

    /// Capacity of the notification broadcast channel.
    pub notice_capacity: usize,

    /// Round ordering rule.
    pub scheduler: SchedulerKind,

    /// Incoming attack damage is divided by this while guarding.
    pub guard_divisor: i64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            animation_delay_ms: 700,
            input_delay_ms: 300,
            notice_capacity: 64,
            scheduler: SchedulerKind::default(),
            guard_divisor: 2,
        }
    }
}

impl BattleConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with all pacing delays removed.
    ///
    /// Used for headless simulation and tests.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            animation_delay_ms: 0,
            input_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Set the RNG seed (builder pattern).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the animation delay (builder pattern).
    #[must_use]
    pub fn with_animation_delay_ms(mut self, ms: u64) -> Self {
        self.animation_delay_ms = ms;
        self
    }

    /// Set the scheduler (builder pattern).
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerKind) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the guard divisor (builder pattern).
    #[must_use]
    pub fn with_guard_divisor(mut self, divisor: i64) -> Self {
        self.guard_divisor = divisor;
        self
    }

    #[must_use]
    pub fn animation_delay(&self) -> Duration {
        Duration::from_millis(self.animation_delay_ms)
    }

    #[must_use]
    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BattleConfig::default();
        assert_eq!(config.animation_delay(), Duration::from_millis(700));
        assert_eq!(config.input_delay(), Duration::from_millis(300));
        assert_eq!(config.scheduler, SchedulerKind::RelativeDexterity);
        assert_eq!(config.guard_divisor, 2);
    }

    #[test]
    fn test_instant() {
        let config = BattleConfig::instant().with_seed(9);
        assert_eq!(config.animation_delay(), Duration::ZERO);
        assert_eq!(config.input_delay(), Duration::ZERO);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_partial_json() {
        let config: BattleConfig =
            serde_json::from_str(r#"{"seed": 5, "scheduler": "fastest_first"}"#).unwrap();
        assert_eq!(config.seed, 5);
        assert_eq!(config.scheduler, SchedulerKind::FastestFirst);
        assert_eq!(config.notice_capacity, 64);
    }

    #[test]
    fn test_round_trip() {
        let config = BattleConfig::instant()
            .with_guard_divisor(3)
            .with_scheduler(SchedulerKind::FastestFirst);
        let json = serde_json::to_string(&config).unwrap();
        let back: BattleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
