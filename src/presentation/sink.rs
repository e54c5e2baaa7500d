//! Presentation sinks: where combat text goes to be shown.
//!
//! The battle awaits every `play_text` call before resolving the next
//! event, which keeps pacing serialized. Sink failures never reach the
//! battle loop; they are logged and dropped.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use super::text::CombatText;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresentationError {
    #[error("presentation surface unavailable")]
    Unavailable,

    #[error("failed to play combat text: {0}")]
    Playback(String),
}

/// Displays combat text and signals completion.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    /// Play one line of combat text. Returns when it has finished showing.
    async fn play_text(&self, text: &CombatText) -> Result<(), PresentationError>;
}

/// Discards all text. For headless simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

#[async_trait]
impl PresentationSink for NullSink {
    async fn play_text(&self, _text: &CombatText) -> Result<(), PresentationError> {
        Ok(())
    }
}

/// Writes combat text to the `tracing` log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

#[async_trait]
impl PresentationSink for LogSink {
    async fn play_text(&self, text: &CombatText) -> Result<(), PresentationError> {
        tracing::info!(anchor = %text.anchor, color = ?text.color, "{}", text.text);
        Ok(())
    }
}

/// Records every line in order. Useful for replays and assertions.
#[derive(Debug, Default)]
pub struct TranscriptSink {
    lines: Mutex<Vec<CombatText>>,
}

impl TranscriptSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines.
    pub async fn lines(&self) -> Vec<CombatText> {
        self.lines.lock().await.clone()
    }

    /// Snapshot of the recorded text only.
    pub async fn texts(&self) -> Vec<String> {
        self.lines.lock().await.iter().map(|l| l.text.clone()).collect()
    }
}

#[async_trait]
impl PresentationSink for TranscriptSink {
    async fn play_text(&self, text: &CombatText) -> Result<(), PresentationError> {
        self.lines.lock().await.push(text.clone());
        Ok(())
    }
}

#[async_trait]
impl<S: PresentationSink + ?Sized> PresentationSink for std::sync::Arc<S> {
    async fn play_text(&self, text: &CombatText) -> Result<(), PresentationError> {
        (**self).play_text(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CombatantId, Orientation};

    #[tokio::test]
    async fn test_transcript_records_in_order() {
        let sink = TranscriptSink::new();
        for word in ["one", "two", "three"] {
            sink.play_text(&CombatText::new(word, CombatantId::new(1), Orientation::Left))
                .await
                .unwrap();
        }
        assert_eq!(sink.texts().await, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_shared_sink_forwards() {
        let sink = std::sync::Arc::new(TranscriptSink::new());
        let shared = sink.clone();
        shared
            .play_text(&CombatText::new("hit", CombatantId::new(2), Orientation::Right))
            .await
            .unwrap();
        assert_eq!(sink.texts().await, vec!["hit"]);
    }

    #[tokio::test]
    async fn test_null_sink_accepts_everything() {
        let text = CombatText::new("x", CombatantId::new(1), Orientation::Left);
        assert!(NullSink.play_text(&text).await.is_ok());
        assert!(LogSink.play_text(&text).await.is_ok());
    }
}
