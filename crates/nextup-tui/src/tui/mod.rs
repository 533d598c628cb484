// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the engine snapshot plus the
// transient spin and winner display state. The app loop pushes `UiUpdate`
// messages over an mpsc channel; the TUI applies them to `ViewState` and
// re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use nextup_core::engine::{PoolRow, Snapshot};
use nextup_core::history::{ordinal_label, DrawRecord};
use nextup_core::DrawState;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{UiUpdate, UserCommand};
use layout::build_layout;

/// How long a fresh winner stays highlighted.
pub const WINNER_HIGHLIGHT: Duration = Duration::from_millis(1200);

/// Render interval (~30 fps).
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// A winner being shown for a short time after settling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerFlash {
    pub name: String,
    /// 0 when the rank is not known (celebration only).
    pub ordinal: usize,
    pub until: Instant,
}

/// TUI-local state that mirrors the engine for rendering.
pub struct ViewState {
    /// Source names in tab order (number keys 1-9).
    pub sources: Vec<String>,
    pub source: String,
    pub pool: Vec<PoolRow>,
    pub history: Vec<DrawRecord>,
    pub draw_state: DrawState,
    pub remaining_secs: u32,
    pub spin_duration_secs: u32,
    pub eligible_count: usize,
    pub at_capacity: bool,
    /// Ticks seen in the current spin; drives the rolling name.
    pub ticks: u32,
    /// Index of the selected pool row.
    pub selected: usize,
    /// Whether the add-entry prompt is capturing keys.
    pub input_mode: bool,
    pub input_text: String,
    /// One-line message shown in the help bar until the next key press.
    pub notice: Option<String>,
    pub winner: Option<WinnerFlash>,
    pub celebration: Option<WinnerFlash>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            sources: Vec::new(),
            source: String::new(),
            pool: Vec::new(),
            history: Vec::new(),
            draw_state: DrawState::Idle,
            remaining_secs: 0,
            spin_duration_secs: nextup_core::draw::scheduler::DEFAULT_SPIN_SECS,
            eligible_count: 0,
            at_capacity: false,
            ticks: 0,
            selected: 0,
            input_mode: false,
            input_text: String::new(),
            notice: None,
            winner: None,
            celebration: None,
        }
    }
}

impl ViewState {
    /// Replace the mirrored engine state with `snapshot`.
    ///
    /// Input mode, notices and flashes are TUI-local and left alone.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let was_spinning = self.is_spinning();

        self.sources = snapshot.sources;
        self.source = snapshot.source;
        self.pool = snapshot.pool;
        self.history = snapshot.history;
        self.draw_state = snapshot.draw_state;
        self.remaining_secs = snapshot.remaining_secs;
        self.spin_duration_secs = snapshot.spin_duration_secs;
        self.eligible_count = snapshot.eligible_count;
        self.at_capacity = snapshot.at_capacity;

        if self.is_spinning() && !was_spinning {
            self.ticks = 0;
            self.winner = None;
            self.celebration = None;
        }
        if self.selected >= self.pool.len() {
            self.selected = self.pool.len().saturating_sub(1);
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.draw_state.is_spinning()
    }

    /// The name shown in the spin overlay: cycles through the undrawn
    /// entries, one step per tick.
    pub fn rolling_name(&self) -> Option<&str> {
        let undrawn: Vec<&PoolRow> = self.pool.iter().filter(|r| r.ordinal.is_none()).collect();
        if undrawn.is_empty() {
            return None;
        }
        let idx = self.ticks as usize % undrawn.len();
        Some(undrawn[idx].entry.as_str())
    }

    pub fn selected_row(&self) -> Option<&PoolRow> {
        self.pool.get(self.selected)
    }

    /// Drop flashes whose display time has passed.
    pub fn expire(&mut self, now: Instant) {
        if self.winner.as_ref().is_some_and(|w| now >= w.until) {
            self.winner = None;
        }
        if self.celebration.as_ref().is_some_and(|c| now >= c.until) {
            self.celebration = None;
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate, now: Instant) {
    match update {
        UiUpdate::Snapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::Tick { count } => {
            state.ticks = count;
        }
        UiUpdate::Countdown { remaining_secs } => {
            state.remaining_secs = remaining_secs;
        }
        UiUpdate::Settled { winner, ordinal } => {
            state.notice = Some(format!("{} is up! ({})", winner, ordinal_label(ordinal)));
            state.winner = Some(WinnerFlash {
                name: winner,
                ordinal,
                until: now + WINNER_HIGHLIGHT,
            });
        }
        UiUpdate::Celebrate { winner } => {
            state.celebration = Some(WinnerFlash {
                name: winner,
                ordinal: 0,
                until: now + WINNER_HIGHLIGHT,
            });
        }
        UiUpdate::Notice(text) => {
            state.notice = Some(text);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::pool_grid::render(frame, layout.pool, state);
    widgets::history::render(frame, layout.history, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.is_spinning() || state.celebration.is_some() {
        widgets::spinner::render(frame, layout.pool, state);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop until the user quits or the app loop goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Restore the terminal before the default panic output.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    // 3. View state, input stream, render interval
    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();
    let mut render_tick = tokio::time::interval(RENDER_INTERVAL);
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 4. Main loop
    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        apply_ui_update(&mut view_state, ui_update, Instant::now());
                    }
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                view_state.expire(Instant::now());
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    // 5. Restore terminal
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
