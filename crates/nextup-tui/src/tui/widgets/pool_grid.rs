// Pool grid widget: every entry of the active list laid out in columns.
//
// Drawn entries are struck through with their ordinal badge ("2nd"). The
// selected cell is reversed, and a fresh winner is highlighted until its
// flash expires.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use nextup_core::engine::PoolRow;

use crate::tui::ViewState;

/// Narrowest column, so short names still get breathing room.
const MIN_COLUMN_WIDTH: usize = 12;
/// Blank cells between columns.
const COLUMN_GAP: usize = 2;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = format!(" {} ({}) ", state.source, state.pool.len());
    let block = Block::default().borders(Borders::ALL).title(title);

    if state.pool.is_empty() {
        let paragraph = Paragraph::new("  No names yet. Press a to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let visible_rows = area.height.saturating_sub(2) as usize;
    let column_width = column_width(&state.pool);
    let columns = column_count(inner_width, column_width);

    // Keep the selected cell's row on screen.
    let selected_row = state.selected / columns;
    let first_row = (selected_row + 1).saturating_sub(visible_rows.max(1));

    let winner = state.winner.as_ref().map(|w| w.name.as_str());
    let lines: Vec<Line> = state
        .pool
        .chunks(columns)
        .enumerate()
        .skip(first_row)
        .take(visible_rows)
        .map(|(row_idx, row)| {
            let mut spans = Vec::new();
            for (col_idx, cell) in row.iter().enumerate() {
                let idx = row_idx * columns + col_idx;
                let text = format!("{:<width$}", cell_text(cell), width = column_width);
                spans.push(Span::styled(
                    text,
                    cell_style(cell, idx == state.selected, winner),
                ));
                spans.push(Span::raw(" ".repeat(COLUMN_GAP)));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Cell label: the name, plus the ordinal badge once drawn.
pub fn cell_text(row: &PoolRow) -> String {
    match &row.ordinal_label {
        Some(label) => format!("{} {}", row.entry, label),
        None => row.entry.to_string(),
    }
}

/// Width that fits the longest cell label.
pub fn column_width(rows: &[PoolRow]) -> usize {
    rows.iter()
        .map(|r| cell_text(r).chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_COLUMN_WIDTH)
}

/// How many columns of `column_width` fit in `width`. Always at least one.
pub fn column_count(width: usize, column_width: usize) -> usize {
    (width / (column_width + COLUMN_GAP)).max(1)
}

fn cell_style(row: &PoolRow, selected: bool, winner: Option<&str>) -> Style {
    let mut style = if winner.is_some_and(|w| row.entry == w) {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if row.ordinal.is_some() {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::view;
    use crate::tui::WinnerFlash;
    use std::time::Instant;

    #[test]
    fn drawn_cells_carry_ordinal_badge() {
        let state = view(&["Ada", "Grace", "Linus"], &["Linus", "Ada"]);
        assert_eq!(cell_text(&state.pool[0]), "Ada 2nd");
        assert_eq!(cell_text(&state.pool[1]), "Grace");
        assert_eq!(cell_text(&state.pool[2]), "Linus 1st");
    }

    #[test]
    fn column_sizing() {
        let state = view(&["A", "A much longer name here"], &[]);
        assert_eq!(column_width(&state.pool), 23);
        assert_eq!(column_width(&view(&["A"], &[]).pool), MIN_COLUMN_WIDTH);
        assert_eq!(column_count(60, 13), 4);
        assert_eq!(column_count(5, 13), 1);
    }

    #[test]
    fn styles_reflect_drawn_selected_and_winner() {
        let state = view(&["Ada", "Grace"], &["Ada"]);
        let drawn = cell_style(&state.pool[0], false, None);
        assert!(drawn.add_modifier.contains(Modifier::CROSSED_OUT));

        let selected = cell_style(&state.pool[1], true, None);
        assert!(selected.add_modifier.contains(Modifier::REVERSED));

        let winner = cell_style(&state.pool[0], false, Some("Ada"));
        assert_eq!(winner.bg, Some(Color::Yellow));
    }

    #[test]
    fn render_highlights_winner_and_scrolls_to_selection() {
        let names: Vec<String> = (0..60).map(|i| format!("name {i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut state = view(&refs, &[]);
        state.selected = 59;
        state.winner = Some(WinnerFlash {
            name: "name 59".into(),
            ordinal: 1,
            until: Instant::now(),
        });

        let backend = ratatui::backend::TestBackend::new(40, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("name 59"));
        assert!(!screen.contains("name 00"));
    }

    #[test]
    fn render_empty_pool_prompts_to_add() {
        let state = view(&[], &[]);
        let backend = ratatui::backend::TestBackend::new(60, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("No names yet"));
    }
}
