// Output collaborators: audio cues and winner celebration.
//
// The engine calls these synchronously from its event pump. Failures are
// logged by the engine and never affect selection.

use crate::pool::Entry;

/// Audio cues for a spin.
pub trait AudioSink: Send {
    /// Called once per suspense tick.
    fn tick(&mut self) -> anyhow::Result<()>;

    /// Called once when a spin settles.
    fn settle(&mut self, winner: &Entry) -> anyhow::Result<()>;
}

/// Visual celebration of a committed winner.
pub trait CelebrationSink: Send {
    fn celebrate(&mut self, winner: &Entry) -> anyhow::Result<()>;
}

/// Sink that does nothing. The engine's default for both roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn tick(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn settle(&mut self, _winner: &Entry) -> anyhow::Result<()> {
        Ok(())
    }
}

impl CelebrationSink for Silent {
    fn celebrate(&mut self, _winner: &Entry) -> anyhow::Result<()> {
        Ok(())
    }
}
