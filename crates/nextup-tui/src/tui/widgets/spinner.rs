// Spin overlay: rolling name and countdown while spinning, then a short
// celebration card for the winner.
//
// Drawn centered over the pool grid, on top of whatever is there.

use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

const DIALOG_WIDTH: u16 = 36;
const DIALOG_HEIGHT: u16 = 6;

/// Spinner frames, advanced once per tick.
const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let (title, color, lines) = if state.is_spinning() {
        (" Picking... ", Color::Cyan, spinning_lines(state))
    } else if let Some(celebration) = &state.celebration {
        (
            " Winner! ",
            Color::Yellow,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("* {} *", celebration.name),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
            ],
        )
    } else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, dialog_area);
}

fn spinning_lines(state: &ViewState) -> Vec<Line<'static>> {
    let spinner = SPINNER_FRAMES[state.ticks as usize % SPINNER_FRAMES.len()];
    let name = state.rolling_name().unwrap_or("...").to_string();

    vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{spinner} "), Style::default().fg(Color::DarkGray)),
            Span::styled(
                name,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {spinner}"), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(
            format!("{}s", state.remaining_secs),
            Style::default().fg(Color::Cyan),
        )),
    ]
}

/// Compute a centered rectangle of the given size within `area`, clamped
/// to the available space.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}
