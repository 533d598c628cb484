// Messages exchanged between the TUI and the app loop.

use nextup_core::Snapshot;

/// Commands sent from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Start a draw over the current eligible set.
    Pick,
    /// Add a name to the active pool.
    AddEntry(String),
    /// Remove the first pool entry with this exact name.
    RemoveEntry(String),
    /// Load a named list, or "custom" for an empty pool.
    SwitchSource(String),
    /// Change the spin length (seconds) for future draws.
    SetSpinDuration(u32),
    Quit,
}

/// Updates pushed from the app loop to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Full view of the engine after a state change.
    Snapshot(Box<Snapshot>),
    /// Suspense tick during a spin.
    Tick { count: u32 },
    /// Countdown step during a spin.
    Countdown { remaining_secs: u32 },
    /// A winner was committed as the `ordinal`-th draw.
    Settled { winner: String, ordinal: usize },
    /// Celebration effect for a fresh winner.
    Celebrate { winner: String },
    /// One-line message for the help bar.
    Notice(String),
}
