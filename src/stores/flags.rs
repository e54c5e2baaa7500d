//! Story flags raised by battle outcomes.

use rustc_hash::FxHashSet;

/// Persistent world flags. Defeating certain enemies raises flags.
pub trait FlagStore: Send + Sync {
    fn raise(&mut self, flag: u32);

    fn is_raised(&self, flag: u32) -> bool;
}

/// In-memory flag store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagSet {
    raised: FxHashSet<u32>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raised.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raised.is_empty()
    }
}

impl FlagStore for FlagSet {
    fn raise(&mut self, flag: u32) {
        if self.raised.insert(flag) {
            tracing::debug!("Raised flag {}", flag);
        }
    }

    fn is_raised(&self, flag: u32) -> bool {
        self.raised.contains(&flag)
    }
}
