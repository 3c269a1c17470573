//! Diff sidebar renderer for redline.
//!
//! Top to bottom: status tabs with counts, the diff list for the active tab,
//! a detail pane for the selected diff (inline highlighted sentence plus its
//! AI review), and a one-line review sync strip.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use redline_core::index::{by_status, StatusFilter};
use redline_core::review_sync::{ReviewSyncState, SyncStatus};
use redline_core::sentence::{highlight_segments, Segment};
use redline_core::style::{
    compliance_icon, risk_colour, status_style, INSERTED_TEXT, REMOVED_TEXT,
};
use redline_core::types::{DiffRecord, ReviewRecord};

use crate::app::{AppState, PanelFocus};
use crate::theme::{rgb, Theme};
use crate::ui::layout::{inner_rect, panel_block};

/// Characters of payload text shown per list row before truncation.
const ROW_TEXT_CHARS: usize = 36;

/// Renders the sidebar and caches the list's inner area in
/// `state.diff_list_rect` for mouse selection.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the sidebar `Rect` including borders
/// * `state` — app state; the list selection is rendered statefully
/// * `theme` — active color theme
pub fn render_sidebar(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    if area.width == 0 {
        state.diff_list_rect = Rect::default();
        return;
    }
    let title = format!(" Diffs ({}) ", state.diffs.len());
    frame.render_widget(panel_block(title, state.focus == PanelFocus::Sidebar, theme), area);

    let inner = inner_rect(area);
    let [tabs_area, list_area, detail_area, strip_area] = inner.layout(&Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Percentage(40),
        Constraint::Length(1),
    ]));

    frame.render_widget(status_tabs(state, theme), tabs_area);

    let items: Vec<ListItem> = {
        let visible = state.visible_diffs();
        if visible.is_empty() {
            vec![ListItem::new(Line::styled("No differences", Style::default().fg(theme.muted)))]
        } else {
            visible.iter().map(|d| diff_item(d, state.reviews.get(&d.element_id), theme)).collect()
        }
    };
    state.diff_list_rect = list_area;
    frame.render_stateful_widget(
        List::new(items).highlight_style(Style::default().bg(theme.selection_bg)),
        list_area,
        &mut state.diff_list_state,
    );

    let detail = match state.selected_record() {
        Some(diff) => detail_text(diff, state.reviews.get(&diff.element_id), theme),
        None => Text::styled("Select a diff to see its context.", Style::default().fg(theme.muted)),
    };
    frame.render_widget(
        Paragraph::new(detail)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(theme.border_inactive)),
            )
            .wrap(Wrap { trim: false }),
        detail_area,
    );

    frame.render_widget(
        Paragraph::new(review_strip(&state.review, state.review_max_attempts, theme)),
        strip_area,
    );
}

fn status_tabs(state: &AppState, theme: &Theme) -> Tabs<'static> {
    let buckets = by_status(&state.diffs);
    let titles = StatusFilter::TABS.iter().map(|tab| {
        let count = buckets.get(*tab).len();
        match tab {
            StatusFilter::All => Line::from(format!("全部 {count}")),
            StatusFilter::Only(status) => {
                let style = status_style(*status);
                Line::styled(
                    format!("{} {count}", style.label),
                    Style::default().fg(rgb(style.fill)),
                )
            }
        }
    });
    let selected = StatusFilter::TABS.iter().position(|t| *t == state.filter).unwrap_or(0);
    Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .divider(Span::styled("│", Style::default().fg(theme.muted)))
}

/// One list row: `[修改] p.3 payload text…  ✔ 高`.
fn diff_item(diff: &DiffRecord, review: Option<&ReviewRecord>, theme: &Theme) -> ListItem<'static> {
    let style = status_style(diff.status);
    let mut spans = vec![
        Span::styled(format!("[{}] ", style.label), Style::default().fg(rgb(style.fill))),
        Span::styled(
            format!("p.{} ", diff.page_index.saturating_add(1)),
            Style::default().fg(theme.muted),
        ),
        Span::styled(truncate(&diff.elements, ROW_TEXT_CHARS), Style::default().fg(theme.text)),
    ];
    if let Some(review) = review {
        let (icon, colour) = compliance_icon(review.compliance_class());
        spans.push(Span::raw("  "));
        spans.push(Span::styled(icon, Style::default().fg(rgb(colour))));
        spans.push(Span::styled(
            format!(" {}", review.risk().as_str()),
            Style::default().fg(rgb(risk_colour(review.risk()))),
        ));
    }
    ListItem::new(Line::from(spans))
}

/// First `max` characters of the first line of `text`, with an ellipsis when
/// anything was cut.
fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && line.len() == text.trim_end().len() {
        return line.to_owned();
    }
    let mut out: String = line.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn detail_text(diff: &DiffRecord, review: Option<&ReviewRecord>, theme: &Theme) -> Text<'static> {
    let style = status_style(diff.status);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", style.label), Style::default().fg(rgb(style.fill)).bold()),
            Span::styled(
                format!("{} · page {}", diff.element_id, diff.page_index.saturating_add(1)),
                Style::default().fg(theme.muted),
            ),
        ]),
        segment_line(&highlight_segments(diff), theme),
    ];

    if let Some(review) = review {
        let (icon, colour) = compliance_icon(review.compliance_class());
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled(format!("{icon} "), Style::default().fg(rgb(colour))),
            Span::styled(review.compliance.clone(), Style::default().fg(theme.text)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("风险 ", Style::default().fg(theme.muted)),
            Span::styled(
                review.risk().as_str(),
                Style::default().fg(rgb(risk_colour(review.risk()))).bold(),
            ),
        ]));
        lines.extend(
            review
                .review_suggestions
                .lines()
                .map(|l| Line::styled(l.to_owned(), Style::default().fg(theme.text))),
        );
    }
    Text::from(lines)
}

/// Turns inline segments into a styled line: the changed span in its status
/// colour, MODIFY substitutions as struck-through old text followed by the
/// new text.
pub fn segment_line(segments: &[Segment], theme: &Theme) -> Line<'static> {
    let spans: Vec<Span<'static>> = segments
        .iter()
        .map(|segment| match segment {
            Segment::Plain(t) => Span::styled(t.clone(), Style::default().fg(theme.text)),
            Segment::Highlight(status, t) => Span::styled(
                t.clone(),
                Style::default()
                    .fg(rgb(status_style(*status).fill))
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
            Segment::Removed(t) => Span::styled(
                t.clone(),
                Style::default().fg(rgb(REMOVED_TEXT)).add_modifier(Modifier::CROSSED_OUT),
            ),
            Segment::Inserted(t) => {
                Span::styled(t.clone(), Style::default().fg(rgb(INSERTED_TEXT)))
            }
        })
        .collect();
    Line::from(spans)
}

/// Review sync status line shown under the detail pane.
fn review_strip(review: &ReviewSyncState, max_attempts: u32, theme: &Theme) -> Line<'static> {
    match review.status {
        SyncStatus::Idle if review.enabled => {
            Line::styled("AI review idle", Style::default().fg(theme.muted))
        }
        SyncStatus::Idle => Line::styled("AI review disabled", Style::default().fg(theme.muted)),
        SyncStatus::Processing => Line::styled(
            format!("AI review running… attempt {}/{max_attempts}", review.attempts),
            Style::default().fg(theme.status_mode),
        ),
        SyncStatus::Completed => Line::styled(
            format!("AI review: {} results", review.reviews.len()),
            Style::default().fg(theme.text),
        ),
        SyncStatus::Error => {
            let reason = review.last_error.clone().unwrap_or_else(|| "unknown error".to_owned());
            Line::from(vec![
                Span::styled(
                    format!("AI review failed: {reason} "),
                    Style::default().fg(rgb(REMOVED_TEXT)),
                ),
                Span::styled("(r to retry)", Style::default().fg(theme.muted)),
            ])
        }
    }
}
