// Draw scheduling: the timed spin state machine and its timer group.

pub mod scheduler;
pub mod timers;

pub use scheduler::{DrawScheduler, DrawState, SpinDuration, SpinEvent};
pub use timers::{TimerFire, TimerGroup};
