// TUI widget modules, one per screen zone.

pub mod help_bar;
pub mod history;
pub mod pool_grid;
pub mod spinner;
pub mod status_bar;
