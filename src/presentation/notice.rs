//! Battle notifications for presentation subscribers.
//!
//! The battle publishes a `BattleNotice` at each observable milestone:
//! `round-started`, `event-resolved`, `battle-won`, `battle-lost`, and
//! `battle-ended` (flight). Delivery is best-effort over a broadcast
//! channel; publishing never blocks and never fails the battle.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::combat::{CombatResult, EventId};

/// A notification published by the battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleNotice {
    RoundStarted { round: u32 },
    EventResolved { event: EventId, results: Vec<CombatResult> },
    BattleWon { round: u32 },
    BattleLost { round: u32 },
    BattleEnded { round: u32 },
}

impl BattleNotice {
    /// Stable wire-style name of the notification.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BattleNotice::RoundStarted { .. } => "round-started",
            BattleNotice::EventResolved { .. } => "event-resolved",
            BattleNotice::BattleWon { .. } => "battle-won",
            BattleNotice::BattleLost { .. } => "battle-lost",
            BattleNotice::BattleEnded { .. } => "battle-ended",
        }
    }

    /// Does this notice end the battle?
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BattleNotice::BattleWon { .. }
                | BattleNotice::BattleLost { .. }
                | BattleNotice::BattleEnded { .. }
        )
    }
}

/// Broadcast bus for battle notifications.
#[derive(Clone, Debug)]
pub struct NoticeBus {
    tx: broadcast::Sender<BattleNotice>,
}

impl NoticeBus {
    /// Create a bus with the given per-subscriber buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a notice to all current subscribers.
    pub fn publish(&self, notice: BattleNotice) {
        let name = notice.name();
        if self.tx.send(notice).is_err() {
            // No subscribers is normal for headless battles
            tracing::trace!("No subscribers for {}", name);
        }
    }

    /// Subscribe to all future notices.
    pub fn subscribe(&self) -> broadcast::Receiver<BattleNotice> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = NoticeBus::default();
        bus.publish(BattleNotice::RoundStarted { round: 1 });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = NoticeBus::with_capacity(8);
        let mut rx = bus.subscribe();

        bus.publish(BattleNotice::RoundStarted { round: 1 });
        bus.publish(BattleNotice::BattleWon { round: 1 });

        assert_eq!(rx.recv().await.unwrap().name(), "round-started");
        let last = rx.recv().await.unwrap();
        assert_eq!(last.name(), "battle-won");
        assert!(last.is_terminal());
    }
}
