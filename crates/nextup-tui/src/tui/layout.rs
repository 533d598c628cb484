// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row): source tabs, counts           |
// +-------------------------------+------------------+
// | Pool Grid (70%)               | History (30%)    |
// +-------------------------------+------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The spin overlay is drawn on top of the pool grid.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub pool: Rect,
    pub history: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(5),    // pool + history
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(vertical[1]);

    AppLayout {
        status_bar: vertical[0],
        pool: horizontal[0],
        history: horizontal[1],
        help_bar: vertical[2],
    }
}
