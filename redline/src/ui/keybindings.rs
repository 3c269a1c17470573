//! Keybinding dispatcher for redline.
//!
//! Translates crossterm key and mouse events into `AppState` mutations. Key
//! handlers return a `KeyAction` for the event loop; mouse input only mutates. Dispatch branches on
//! `state.mode` first so help mode keys never reach the page handlers.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use redline_core::navigator::{Gesture, NavKey};

use crate::app::{AppState, Mode};
use crate::ui::help::help_line_count;

/// Control-flow signal returned from the dispatchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
    /// Restart AI review polling; the controller lives in the event loop.
    RetryReviews,
}

/// Dispatches a key event to the handler matching the current mode.
///
/// # Arguments
///
/// * `key`   — the raw crossterm key event
/// * `state` — mutable reference to all UI state
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::Help => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let nav_key = match key.code {
        KeyCode::Down => Some(NavKey::Down),
        KeyCode::PageDown => Some(NavKey::PageDown),
        KeyCode::Up => Some(NavKey::Up),
        KeyCode::PageUp => Some(NavKey::PageUp),
        KeyCode::Home => Some(NavKey::Home),
        KeyCode::End => Some(NavKey::End),
        _ => None,
    };
    if let Some(nav_key) = nav_key {
        state.navigate(Gesture::Key(nav_key));
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('j') => state.move_selection(1),
        KeyCode::Char('k') => state.move_selection(-1),
        KeyCode::Tab => state.set_filter(state.filter.next()),
        KeyCode::BackTab => state.set_filter(state.filter.prev()),

        KeyCode::Char('H') => state.focus = state.focus.prev(),
        KeyCode::Char('L') => state.focus = state.focus.next(),

        KeyCode::Char('+') | KeyCode::Char('=') => state.zoom_by(1.25),
        KeyCode::Char('-') => state.zoom_by(0.8),
        KeyCode::Char('0') => state.set_zoom(1.0),

        KeyCode::Char('r') => return KeyAction::RetryReviews,
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::Help;
        }
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        _ => {}
    }
    KeyAction::Continue
}

/// Help mode: j/k/g/G scroll, `?`, `Esc` or `q` close. Other keys are ignored.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = (state.help_scroll + 1).min(help_line_count()),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = help_line_count(),
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// Handles a mouse event.
///
/// Motion drives hover emphasis, a left click selects the region or list row
/// under the pointer, a vertical left-button drag is a swipe, and the wheel
/// turns pages (or scrolls the list when over the sidebar). In help mode the
/// wheel scrolls the help text and everything else is ignored.
///
/// # Arguments
///
/// * `mouse` — the crossterm mouse event
/// * `state` — mutable reference to all UI state
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) {
    let (col, row) = (mouse.column, mouse.row);
    if state.mode == Mode::Help {
        match mouse.kind {
            MouseEventKind::ScrollUp => state.help_scroll = state.help_scroll.saturating_sub(3),
            MouseEventKind::ScrollDown => {
                state.help_scroll = (state.help_scroll + 3).min(help_line_count());
            }
            _ => {}
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
            state.pointer_moved(col, row)
        }
        MouseEventKind::Down(MouseButton::Left) => state.mouse_down(col, row),
        MouseEventKind::Up(MouseButton::Left) => state.mouse_up(row),
        MouseEventKind::ScrollUp => state.wheel(col, row, false),
        MouseEventKind::ScrollDown => state.wheel(col, row, true),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use redline_core::index::StatusFilter;
    use redline_core::navigator::NavConfig;
    use redline_core::types::DiffStatus;
    use std::path::PathBuf;
    use tokio::sync::mpsc;

    use crate::app::PanelFocus;

    fn state() -> AppState {
        let comparison = serde_json::from_str(
            r#"{
                "comparison_id": "c",
                "standard_images": ["s0.png", "s1.png"],
                "target_images": ["t0.png", "t1.png"],
                "diff_list": [
                    {"element_id": "a", "status": "ADD", "page_index": 0},
                    {"element_id": "b", "status": "MOVE", "page_index": 1}
                ]
            }"#,
        )
        .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        AppState::new(comparison, NavConfig::default(), 100, PathBuf::new(), &tx)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrow_keys_turn_pages() {
        let mut s = state();
        assert_eq!(handle_key(press(KeyCode::Down), &mut s), KeyAction::Continue);
        assert_eq!(s.page(), 1);
    }

    #[test]
    fn quit_and_retry_are_signalled() {
        let mut s = state();
        assert_eq!(handle_key(press(KeyCode::Char('r')), &mut s), KeyAction::RetryReviews);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), KeyAction::Quit);
    }

    #[test]
    fn tab_cycles_status_filter() {
        let mut s = state();
        handle_key(press(KeyCode::Tab), &mut s);
        assert_eq!(s.filter, StatusFilter::Only(DiffStatus::Add));
        handle_key(press(KeyCode::BackTab), &mut s);
        handle_key(press(KeyCode::BackTab), &mut s);
        assert_eq!(s.filter, StatusFilter::Only(DiffStatus::Move));
    }

    #[test]
    fn help_mode_swallows_page_keys() {
        let mut s = state();
        handle_key(press(KeyCode::Char('?')), &mut s);
        assert_eq!(s.mode, Mode::Help);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), KeyAction::Continue);
        assert_eq!(s.mode, Mode::Normal);

        handle_key(press(KeyCode::Char('?')), &mut s);
        handle_key(press(KeyCode::Down), &mut s);
        assert_eq!(s.page(), 0);
        handle_key(press(KeyCode::Char('G')), &mut s);
        assert_eq!(s.help_scroll, help_line_count());
    }

    #[test]
    fn focus_and_zoom_keys() {
        let mut s = state();
        handle_key(press(KeyCode::Char('L')), &mut s);
        assert_eq!(s.focus, PanelFocus::Target);
        handle_key(press(KeyCode::Char('+')), &mut s);
        assert_eq!(s.zoom, 1.25);
        handle_key(press(KeyCode::Char('0')), &mut s);
        assert_eq!(s.zoom, 1.0);
    }

    #[test]
    fn wheel_turns_the_page() {
        let mut s = state();
        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 5,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(scroll, &mut s);
        assert_eq!(s.page(), 1);
    }

    #[test]
    fn help_mode_wheel_scrolls_help() {
        let mut s = state();
        handle_key(press(KeyCode::Char('?')), &mut s);
        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 5,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(scroll, &mut s);
        assert_eq!(s.help_scroll, 3.min(help_line_count()));
        assert_eq!(s.page(), 0);
        assert_eq!(s.mode, Mode::Help);
    }
}
