use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crate::ui::app::App;

/// Work the event loop has to start on behalf of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Ask { token: u64, input: String },
}

pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let page = app.get_display_visible_lines();

    match key.code {
        // Quit
        KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if ctrl => app.quit(),

        // Ask the current question
        KeyCode::Enter => {
            let token = app.begin_request()?;
            return Some(Action::Ask {
                token,
                input: app.input.clone(),
            });
        }

        // Clear input with Ctrl+U (must come before general Char pattern)
        KeyCode::Char('u') if ctrl => app.clear_input(),

        // Text editing
        KeyCode::Char(c) if !ctrl => app.add_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Delete => app.delete_char_forward(),

        // Cursor movement
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),

        // Response scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(page),
        KeyCode::PageDown => app.scroll_down(page),

        _ => {}
    }

    None
}
