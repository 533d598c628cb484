// Help bar widget: key hints, the add-entry prompt, or the latest notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = if state.input_mode {
        Line::from(vec![
            Span::styled(" Add name: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{}_", state.input_text),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  (Enter to add, Esc to cancel)",
                Style::default().fg(Color::Gray),
            ),
        ])
    } else if let Some(notice) = &state.notice {
        Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(Span::styled(
            key_hints(state.spin_duration_secs),
            Style::default().fg(Color::White).add_modifier(Modifier::DIM),
        ))
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn key_hints(spin_secs: u32) -> String {
    format!(
        " Enter:Pick | 1-9:Lists | a:Add | d:Remove | j/k:Move | +/-:Spin {spin_secs}s | q:Quit"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::view;

    fn line(state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(100, 1);
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
    fn shows_key_hints_by_default() {
        let state = view(&["A"], &[]);
        let text = line(&state);
        assert!(text.contains("Enter:Pick"));
        assert!(text.contains("Spin 7s"));
    }

    #[test]
    fn notice_replaces_hints() {
        let mut state = view(&["A"], &[]);
        state.notice = Some("The list is full".into());
        let text = line(&state);
        assert!(text.contains("The list is full"));
        assert!(!text.contains("Enter:Pick"));
    }

    #[test]
    fn input_mode_shows_prompt() {
        let mut state = view(&["A"], &[]);
        state.input_mode = true;
        state.input_text = "Bo".into();
        assert!(line(&state).contains("Add name: Bo_"));
    }
}
