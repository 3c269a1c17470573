//! UI rendering module for redline.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`, the
//! page panes in `page_view.rs` and the diff list in `sidebar.rs`.

pub mod help;
pub mod keybindings;
pub mod layout;
pub mod page_view;
pub mod sidebar;

use ratatui::Frame;
use redline_core::types::DocVariant;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Renders one complete frame: page panes, sidebar, status bar and, in help
/// mode, the help overlay on top.
///
/// Hidden panes get an empty canvas so stale rects cannot catch mouse events.
///
/// # Arguments
///
/// * `frame` — current render frame provided by `terminal.draw()`
/// * `state` — mutable app state; canvas and list rects are cached here
/// * `theme` — active color theme
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let rects = compute_layout(frame.area(), state.focus);

    let panes = [(DocVariant::Standard, rects.standard), (DocVariant::Target, rects.target)];
    for (variant, area) in panes {
        if area.width == 0 {
            state.pane_mut(variant).canvas = Default::default();
        } else {
            page_view::render_page(frame, area, variant, state, theme);
        }
    }
    sidebar::render_sidebar(frame, rects.sidebar, state, theme);
    render_status_bar(frame, rects.status_bar, state, theme);

    if state.mode == Mode::Help {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
