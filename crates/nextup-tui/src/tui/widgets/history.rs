// History widget: who has been picked, in order.
//
// Each line: "{ordinal}  {name}  {HH:MM:SS}". The newest pick is at the
// bottom; when the list overflows, the oldest lines scroll off the top.

use chrono::Local;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use nextup_core::history::{ordinal_label, DrawRecord};

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Picked ({}) ", state.history.len()));

    if state.history.is_empty() {
        let paragraph = Paragraph::new("  Nobody yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = area.height.saturating_sub(2) as usize;
    let skip = state.history.len().saturating_sub(visible_rows);
    let newest = state.history.len() - 1;

    let lines: Vec<Line> = state
        .history
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(idx, record)| history_line(idx + 1, record, idx == newest))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn history_line(rank: usize, record: &DrawRecord, newest: bool) -> Line<'static> {
    let name_style = if newest {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let time = record.drawn_at.with_timezone(&Local).format("%H:%M:%S");

    Line::from(vec![
        Span::styled(
            format!(" {:>5} ", ordinal_label(rank)),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(record.entry.to_string(), name_style),
        Span::styled(format!("  {time}"), Style::default().fg(Color::DarkGray)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::view;

    fn screen(state: &ViewState, width: u16, height: u16) -> String {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn empty_history_placeholder() {
        let state = view(&["A"], &[]);
        assert!(screen(&state, 30, 4).contains("Nobody yet"));
    }

    #[test]
    fn lists_picks_with_ordinals() {
        let state = view(&["A", "B", "C"], &["C", "A"]);
        let text = screen(&state, 40, 6);
        assert!(text.contains("1st C"));
        assert!(text.contains("2nd A"));
        assert!(text.contains("Picked (2)"));
    }

    #[test]
    fn overflow_keeps_newest_visible() {
        let names: Vec<String> = (0..10).map(|i| format!("N{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let state = view(&refs, &refs);
        let text = screen(&state, 40, 5);
        assert!(text.contains("10th N9"));
        assert!(!text.contains(" N0 "));
    }
}
