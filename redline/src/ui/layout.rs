//! Responsive layout for redline.
//!
//! Pure layout arithmetic, recomputed inside every `terminal.draw()`.
//!
//! # Panel geometry
//!
//! At `>= 120` columns the standard and target panes sit side by side with
//! the diff sidebar on the right. Narrower terminals show only the focused
//! page pane (standard unless the target is focused) next to the sidebar;
//! below 80 columns the sidebar is dropped too.
//!
//! `Spacing::Overlap(1)` combined with `MergeStrategy::Fuzzy` makes adjacent
//! panel borders share a single column.

use ratatui::{
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Style, Stylize},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
    Frame,
};
use redline_core::review_sync::SyncStatus;
use redline_core::style::status_style;
use redline_core::types::DiffStatus;

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::{rgb, Theme};

/// Panel rects for one frame. A zero-width rect means the panel is hidden.
pub struct PanelRects {
    pub standard: Rect,
    pub target: Rect,
    pub sidebar: Rect,
    pub status_bar: Rect,
}

/// Splits the frame into page panes, sidebar and a 1-row status bar.
///
/// # Arguments
///
/// * `area` — the full frame area
/// * `focus` — current focus; decides which page pane survives on narrow terminals
pub fn compute_layout(area: Rect, focus: PanelFocus) -> PanelRects {
    let [main_area, status_bar] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let width = area.width;
    // Borders only merge between two visible panels; a hidden one gets no overlap.
    let (sidebar_width, sidebar_spacing) = if width >= 80 {
        (Constraint::Percentage(30), Spacing::Overlap(1))
    } else {
        (Constraint::Length(0), Spacing::Space(0))
    };
    let [pages, sidebar] = main_area.layout(
        &Layout::horizontal([Constraint::Fill(1), sidebar_width]).spacing(sidebar_spacing),
    );

    let (split, page_spacing) = if width >= 120 {
        ([Constraint::Percentage(50), Constraint::Percentage(50)], Spacing::Overlap(1))
    } else if focus == PanelFocus::Target {
        ([Constraint::Length(0), Constraint::Fill(1)], Spacing::Space(0))
    } else {
        ([Constraint::Fill(1), Constraint::Length(0)], Spacing::Space(0))
    };
    let [standard, target] = pages.layout(&Layout::horizontal(split).spacing(page_spacing));

    PanelRects { standard, target, sidebar, status_bar }
}

/// Returns the inner `Rect` of a panel after removing its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel. Focused panels get a thick border
/// in `border_active`.
///
/// # Arguments
///
/// * `title` — panel title shown in the top border
/// * `is_focused` — `true` when this panel has keyboard focus
/// * `theme` — active color theme
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar: mode, page, zoom, diff counts, review state.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mode_text = match state.mode {
        Mode::Normal => " NORMAL ",
        Mode::Help => " HELP ",
    };
    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(theme.status_mode).bold()),
        Span::raw(format!(
            " page {}/{} ",
            state.page() + 1,
            state.navigator.page_count().max(1)
        )),
        Span::raw(format!(" {:.0}% ", state.zoom * 100.0)),
    ];

    let summary = state.comparison.summary();
    spans.push(Span::raw(format!(" Σ{} ", summary.total_differences)));
    for status in DiffStatus::ALL {
        let style = status_style(status);
        spans.push(Span::styled(
            format!(" {} {} ", style.label, summary.count(status)),
            Style::default().fg(rgb(style.fill)),
        ));
    }

    let review = match state.review.status {
        SyncStatus::Idle => None,
        SyncStatus::Processing => Some(" AI review… "),
        SyncStatus::Completed => Some(" AI review ✔ "),
        SyncStatus::Error => Some(" AI review failed (r) "),
    };
    if let Some(text) = review {
        spans.push(Span::styled(text, Style::default().fg(theme.status_mode)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
