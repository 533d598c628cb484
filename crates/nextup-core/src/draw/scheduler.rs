// Draw scheduler: the Idle -> Spinning -> Settled -> Idle state machine.
//
// A draw request captures the eligible set and the spin duration, then owns
// a `TimerGroup` until the settle deadline. The winner is picked uniformly
// from the captured set at the instant of settlement.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use super::timers::{TimerFire, TimerGroup};
use crate::pool::Entry;

// ---------------------------------------------------------------------------
// Spin duration
// ---------------------------------------------------------------------------

pub const MIN_SPIN_SECS: u32 = 3;
pub const MAX_SPIN_SECS: u32 = 7;
pub const DEFAULT_SPIN_SECS: u32 = 7;

/// Length of a spin in whole seconds, always within
/// [`MIN_SPIN_SECS`]..=[`MAX_SPIN_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpinDuration(u32);

impl SpinDuration {
    /// Returns `None` for values outside the allowed range.
    pub fn new(secs: u32) -> Option<Self> {
        (MIN_SPIN_SECS..=MAX_SPIN_SECS)
            .contains(&secs)
            .then_some(SpinDuration(secs))
    }

    pub fn as_secs(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for SpinDuration {
    fn default() -> Self {
        SpinDuration(DEFAULT_SPIN_SECS)
    }
}

// ---------------------------------------------------------------------------
// State and events
// ---------------------------------------------------------------------------

/// Where the scheduler is in its cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DrawState {
    Idle,
    Spinning {
        /// Seconds left on the countdown display, floored at zero.
        remaining_secs: u32,
        /// Ticks emitted so far in this spin.
        ticks: u32,
    },
    /// The commit instant. The facade moves the scheduler back to `Idle`
    /// right after it has recorded the winner and fired the settle signals.
    Settled { winner: Entry },
}

impl DrawState {
    pub fn name(&self) -> &'static str {
        match self {
            DrawState::Idle => "Idle",
            DrawState::Spinning { .. } => "Spinning",
            DrawState::Settled { .. } => "Settled",
        }
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self, DrawState::Spinning { .. })
    }
}

/// Something that happened during a spin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinEvent {
    /// Suspense tick; `count` is the running total for this spin.
    Tick { count: u32 },
    /// The countdown moved down by one second.
    Countdown { remaining_secs: u32 },
    /// The spin ended and `winner` was committed.
    Settled { winner: Entry },
}

// ---------------------------------------------------------------------------
// DrawScheduler
// ---------------------------------------------------------------------------

/// Everything owned by an in-progress spin. Dropping it cancels the timers.
struct ActiveSpin {
    eligible: Vec<Entry>,
    timers: TimerGroup,
}

/// Timed draw state machine. One spin at a time, no external cancellation.
pub struct DrawScheduler {
    state: DrawState,
    spin: Option<ActiveSpin>,
    rng: Box<dyn RngCore + Send>,
}

impl Default for DrawScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawScheduler {
    /// Scheduler backed by an OS-seeded `StdRng`.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Scheduler backed by the given random source (seeded RNGs in tests).
    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        DrawScheduler {
            state: DrawState::Idle,
            spin: None,
            rng: Box::new(rng),
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    /// Seconds left on the countdown; zero unless a spin is running.
    pub fn remaining_secs(&self) -> u32 {
        match self.state {
            DrawState::Spinning { remaining_secs, .. } => remaining_secs,
            _ => 0,
        }
    }

    /// Start a spin over `eligible` lasting `duration`.
    ///
    /// Returns `false` without changing state if `eligible` is empty or a
    /// spin is already running. The eligible set is captured as given; later
    /// pool edits do not affect this spin.
    pub fn request_draw(&mut self, eligible: Vec<Entry>, duration: SpinDuration) -> bool {
        if self.spin.is_some() {
            debug!("Draw requested while spinning, ignoring");
            return false;
        }
        if eligible.is_empty() {
            debug!("Draw requested with no eligible entries, ignoring");
            return false;
        }

        info!(
            "Spin started: {} eligible, {}s",
            eligible.len(),
            duration.as_secs()
        );
        let timers = TimerGroup::start(duration.as_duration());
        self.state = DrawState::Spinning {
            remaining_secs: duration.as_secs(),
            ticks: 0,
        };
        self.spin = Some(ActiveSpin { eligible, timers });
        true
    }

    /// Wait for the next spin event.
    ///
    /// Returns `None` immediately when no spin is running. On settle the
    /// timer group is dropped before the winner is chosen, so no tick or
    /// countdown can be reported afterwards. The scheduler is left in
    /// `Settled` until [`DrawScheduler::finish`] is called.
    pub async fn next_event(&mut self) -> Option<SpinEvent> {
        let spin = self.spin.as_mut()?;
        let fire = spin.timers.next().await;

        match fire {
            TimerFire::Tick => {
                let DrawState::Spinning { ticks, .. } = &mut self.state else {
                    return None;
                };
                *ticks += 1;
                Some(SpinEvent::Tick { count: *ticks })
            }
            TimerFire::Countdown => {
                let DrawState::Spinning { remaining_secs, .. } = &mut self.state else {
                    return None;
                };
                *remaining_secs = remaining_secs.saturating_sub(1);
                Some(SpinEvent::Countdown {
                    remaining_secs: *remaining_secs,
                })
            }
            TimerFire::Settle => {
                let ActiveSpin { eligible, timers } = self.spin.take()?;
                let elapsed = timers.started_at().elapsed();
                drop(timers);

                let winner = self.choose_winner(&eligible);
                info!(
                    "Spin settled after {:?}: {} (from {} eligible)",
                    elapsed,
                    winner,
                    eligible.len()
                );
                self.state = DrawState::Settled {
                    winner: winner.clone(),
                };
                Some(SpinEvent::Settled { winner })
            }
        }
    }

    /// Leave `Settled` for `Idle`. No-op in any other state.
    pub fn finish(&mut self) {
        if matches!(self.state, DrawState::Settled { .. }) {
            self.state = DrawState::Idle;
        }
    }

    /// Drop any running spin without settling it and return to `Idle`.
    ///
    /// Only the facade's reload path calls this. Returns `true` if a spin was
    /// abandoned.
    pub(crate) fn teardown(&mut self) -> bool {
        let abandoned = self.spin.take().is_some();
        self.state = DrawState::Idle;
        abandoned
    }

    /// Uniform pick over `eligible`; every index has probability 1/len.
    fn choose_winner(&mut self, eligible: &[Entry]) -> Entry {
        let idx = self.rng.random_range(0..eligible.len());
        eligible[idx].clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
