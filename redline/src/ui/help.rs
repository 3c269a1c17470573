//! Help overlay renderer for redline.
//!
//! Draws a centred modal over the panel layout. `Clear` erases the cells
//! underneath first, inside the same `terminal.draw()` closure as the panels.

use ratatui::{
    layout::Constraint,
    style::{Style, Stylize},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns, where the modal would
/// collapse to nothing.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `theme` — active color theme
/// * `help_scroll` — vertical scroll offset, moved by j/k in help mode
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }
    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to close ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(help_text(theme))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

/// Number of lines in the help body, used to clamp scrolling.
pub fn help_line_count() -> u16 {
    SECTIONS.iter().map(|(_, keys)| keys.len() as u16 + 2).sum()
}

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Pages",
        &[
            ("↓ / PgDn / wheel", "Next page"),
            ("↑ / PgUp / wheel", "Previous page"),
            ("Home / End", "First / last page"),
            ("drag up / down", "Swipe to next / previous page"),
            ("+ / - / 0", "Zoom in / out / reset"),
        ],
    ),
    (
        "Differences",
        &[
            ("j / k", "Select next / previous diff"),
            ("Tab / Shift-Tab", "Next / previous status tab"),
            ("click region", "Select the diff under the pointer"),
            ("hover region", "Emphasise it and show its sentence"),
        ],
    ),
    (
        "Panels",
        &[
            ("H / L", "Move focus left / right"),
            ("r", "Retry the AI review after it finished or failed"),
        ],
    ),
    (
        "General",
        &[
            ("?", "Open / close this help"),
            ("q / Esc", "Quit"),
        ],
    ),
];

fn help_text(theme: &Theme) -> Text<'static> {
    let mut lines = Vec::new();
    for (title, keys) in SECTIONS {
        lines.push(Line::styled(*title, Style::default().fg(theme.border_active).bold()));
        for (key, action) in *keys {
            lines.push(Line::raw(format!("  {key:<20}{action}")));
        }
        lines.push(Line::raw(""));
    }
    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_matches_rendered_text() {
        let text = help_text(&Theme::dark());
        assert_eq!(text.lines.len() as u16, help_line_count());
    }
}
