// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState changes (selection, add-entry prompt).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use nextup_core::draw::scheduler::{MAX_SPIN_SECS, MIN_SPIN_SECS};
use nextup_core::pool::MAX_POOL_SIZE;

use super::ViewState;
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app loop, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm reports Release events on some platforms.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits regardless of mode.
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.input_mode {
        return handle_input_mode(key_event, view_state);
    }

    view_state.notice = None;

    match key_event.code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(UserCommand::Pick),

        KeyCode::Char(c @ '1'..='9') => {
            let idx = c as usize - '1' as usize;
            view_state
                .sources
                .get(idx)
                .map(|name| UserCommand::SwitchSource(name.clone()))
        }

        KeyCode::Char('a') => {
            if view_state.at_capacity {
                view_state.notice = Some(format!("The list is full ({MAX_POOL_SIZE} names max)"));
            } else {
                view_state.input_mode = true;
                view_state.input_text.clear();
            }
            None
        }

        KeyCode::Char('d') | KeyCode::Delete => view_state
            .selected_row()
            .map(|row| UserCommand::RemoveEntry(row.entry.to_string())),

        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected = view_state.selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.selected + 1 < view_state.pool.len() {
                view_state.selected += 1;
            }
            None
        }

        KeyCode::Char('+') | KeyCode::Char('=') => {
            let secs = view_state.spin_duration_secs;
            (secs < MAX_SPIN_SECS).then(|| UserCommand::SetSpinDuration(secs + 1))
        }
        KeyCode::Char('-') => {
            let secs = view_state.spin_duration_secs;
            (secs > MIN_SPIN_SECS).then(|| UserCommand::SetSpinDuration(secs - 1))
        }

        KeyCode::Char('q') => Some(UserCommand::Quit),

        _ => None,
    }
}

/// Add-entry prompt: printable characters edit, Enter submits, Esc cancels.
fn handle_input_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Enter => {
            view_state.input_mode = false;
            let text = std::mem::take(&mut view_state.input_text);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(UserCommand::AddEntry(trimmed.to_string()))
            }
        }
        KeyCode::Esc => {
            view_state.input_mode = false;
            view_state.input_text.clear();
            None
        }
        KeyCode::Backspace => {
            view_state.input_text.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.input_text.push(c);
            None
        }
        _ => None,
    }
}
