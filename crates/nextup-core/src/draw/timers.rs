// Timer group for a single spin.
//
// The three spin timers (tick, countdown, settle) live in one owned value.
// Creating a `TimerGroup` starts all of them; dropping it cancels all of
// them. Nothing is spawned, so once the group is gone no timer can fire.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior, Sleep};

/// Period of the suspense tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Period of the countdown shown to the user.
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Which timer in the group fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFire {
    Tick,
    Countdown,
    Settle,
}

/// Owned bundle of the tick, countdown and settle timers for one spin.
///
/// All three are scheduled relative to the same start instant. The settle
/// deadline is absolute, so backpressure on the periodic timers never
/// stretches the spin.
#[derive(Debug)]
pub struct TimerGroup {
    started_at: Instant,
    deadline: Instant,
    settle: Pin<Box<Sleep>>,
    tick: Interval,
    countdown: Interval,
    settled: bool,
}

impl TimerGroup {
    /// Start all three timers now. Must be called inside a tokio runtime.
    pub fn start(duration: Duration) -> Self {
        let started_at = Instant::now();
        let deadline = started_at + duration;

        // Late ticks are dropped: they are pure notifications and a burst of
        // them would just be noise. Late countdowns are replayed so the
        // remaining-seconds counter catches up.
        let mut tick = interval_at(started_at + TICK_INTERVAL, TICK_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut countdown = interval_at(started_at + COUNTDOWN_INTERVAL, COUNTDOWN_INTERVAL);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Burst);

        TimerGroup {
            started_at,
            deadline,
            settle: Box::pin(sleep_until(deadline)),
            tick,
            countdown,
            settled: false,
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// The instant the spin settles.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Wait for the next timer to fire.
    ///
    /// Settle takes priority over the periodic timers, so a tick that falls
    /// due at the same instant as the deadline is never reported. After
    /// `Settle` has been returned once, the group is spent and this future
    /// never completes.
    ///
    /// Cancel safe: dropping the future loses no events.
    pub async fn next(&mut self) -> TimerFire {
        if self.settled {
            return std::future::pending().await;
        }

        tokio::select! {
            biased;

            _ = self.settle.as_mut() => {
                self.settled = true;
                TimerFire::Settle
            }
            _ = self.tick.tick() => TimerFire::Tick,
            _ = self.countdown.tick() => TimerFire::Countdown,
        }
    }
}
