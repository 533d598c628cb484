// Terminal implementations of the engine's output collaborators.

use std::io::Write;

use anyhow::Context;
use nextup_core::sink::{AudioSink, CelebrationSink};
use nextup_core::Entry;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::protocol::UiUpdate;

/// Audio cues as terminal bells (BEL, 0x07).
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    pub on_tick: bool,
    pub on_settle: bool,
}

impl TerminalBell {
    fn ring(&self) -> anyhow::Result<()> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07").context("failed to ring terminal bell")?;
        out.flush().context("failed to flush stdout")?;
        Ok(())
    }
}

impl AudioSink for TerminalBell {
    fn tick(&mut self) -> anyhow::Result<()> {
        if self.on_tick {
            self.ring()?;
        }
        Ok(())
    }

    fn settle(&mut self, _winner: &Entry) -> anyhow::Result<()> {
        if self.on_settle {
            self.ring()?;
        }
        Ok(())
    }
}

/// Forwards celebrations to the TUI as `UiUpdate::Celebrate`.
///
/// Never blocks: when the UI channel is full the celebration is dropped and
/// reported as an error.
#[derive(Debug, Clone)]
pub struct ChannelCelebration {
    ui_tx: mpsc::Sender<UiUpdate>,
}

impl ChannelCelebration {
    pub fn new(ui_tx: mpsc::Sender<UiUpdate>) -> Self {
        ChannelCelebration { ui_tx }
    }
}

impl CelebrationSink for ChannelCelebration {
    fn celebrate(&mut self, winner: &Entry) -> anyhow::Result<()> {
        let update = UiUpdate::Celebrate {
            winner: winner.to_string(),
        };
        match self.ui_tx.try_send(update) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => anyhow::bail!("UI channel full, celebration dropped"),
            Err(TrySendError::Closed(_)) => anyhow::bail!("UI channel closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> Entry {
        Entry::parse(name).unwrap()
    }

    #[test]
    fn silent_bell_does_nothing() {
        let mut bell = TerminalBell {
            on_tick: false,
            on_settle: false,
        };
        assert!(bell.tick().is_ok());
        assert!(bell.settle(&entry("Ada")).is_ok());
    }

    #[tokio::test]
    async fn celebration_is_forwarded_to_ui() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut sink = ChannelCelebration::new(tx);
        sink.celebrate(&entry("Ada")).unwrap();

        match rx.recv().await {
            Some(UiUpdate::Celebrate { winner }) => assert_eq!(winner, "Ada"),
            other => panic!("expected Celebrate, got {other:?}"),
        }
    }

    #[test]
    fn celebration_reports_full_and_closed_channels() {
        let (tx, rx) = mpsc::channel(1);
        let mut sink = ChannelCelebration::new(tx);
        sink.celebrate(&entry("Ada")).unwrap();
        let err = sink.celebrate(&entry("Grace")).unwrap_err();
        assert!(err.to_string().contains("full"));

        drop(rx);
        let err = sink.celebrate(&entry("Linus")).unwrap_err();
        assert!(err.to_string().contains("closed"));
    }
}
