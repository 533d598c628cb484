// Library root for the terminal picker: re-exports the app loop, protocol,
// sinks and TUI so the binary and tests share one API.

pub mod app;
pub mod protocol;
pub mod sinks;
pub mod tui;
