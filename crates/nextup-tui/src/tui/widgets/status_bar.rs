// Status bar widget: source tabs, pool counts, spin length.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [source tabs] | [pool counts] | [spin length]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::raw(" ")];
    spans.extend(source_spans(&state.sources, &state.source));

    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!(
            "{} names, {} left",
            state.pool.len(),
            state.eligible_count
        ),
        Style::default().fg(Color::White),
    ));
    if state.at_capacity {
        spans.push(Span::styled(" (full)", Style::default().fg(Color::Red)));
    }

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("spin {}s", state.spin_duration_secs),
        Style::default().fg(Color::White),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Tab spans for the sources, numbered for the 1-9 keys, active one
/// highlighted. E.g. "[1:home] [2:work] [3:custom]"
pub fn source_spans(sources: &[String], active: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (idx, name) in sources.iter().enumerate() {
        let style = if name == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", idx + 1, name), style));
        spans.push(Span::raw(" "));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::view;

    #[test]
    fn source_spans_number_and_highlight_active() {
        let sources = vec!["home".to_string(), "work".to_string(), "custom".to_string()];
        let spans = source_spans(&sources, "work");
        let labels: Vec<&str> = spans
            .iter()
            .step_by(2)
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(labels, vec!["[1:home]", "[2:work]", "[3:custom]"]);
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_shows_counts() {
        let state = view(&["A", "B", "C"], &["B"]);
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let line: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(line.contains("3 names, 2 left"));
        assert!(line.contains("spin 7s"));
    }
}
