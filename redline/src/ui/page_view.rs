//! Page pane renderer: paper, highlight overlay and hover caption.
//!
//! Page images are not rasterised into the terminal. A pane shows the page as
//! a blank sheet sized to the page's aspect ratio, with the diff regions of
//! the active page drawn on it as blended cell backgrounds and box outlines.
//! One terminal cell is one render-space unit, so the overlay's transform maps
//! native image pixels straight onto cells.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
    Frame,
};
use redline_core::overlay::PaintCommand;
use redline_core::style::Rgb;
use redline_core::types::{DiffRegion, DocVariant, PageSize};

use crate::app::{AppState, PanelFocus};
use crate::theme::{rgb, Theme};
use crate::ui::layout::{inner_rect, panel_block};
use crate::ui::sidebar::segment_line;

/// Width-to-height ratio of a terminal cell.
const CELL_ASPECT: f64 = 0.5;

/// Renders one document pane.
///
/// Repaints the overlay into the pane's recording surface only when the
/// overlay reports it is dirty or the canvas size changed, then replays the
/// recorded commands into the frame buffer.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the pane `Rect` including borders
/// * `variant` — which document this pane shows
/// * `state` — app state; the pane's canvas rect is cached here for mouse hit-testing
/// * `theme` — active color theme
pub fn render_page(
    frame: &mut Frame,
    area: Rect,
    variant: DocVariant,
    state: &mut AppState,
    theme: &Theme,
) {
    let page = state.page();
    let name = match variant {
        DocVariant::Standard => "Standard",
        DocVariant::Target => "Target",
    };
    let title = format!(" {name} · p.{}/{} ", page + 1, state.comparison.images(variant).len());
    let focused = state.focus == PanelFocus::from(variant);
    frame.render_widget(panel_block(title, focused, theme), area);

    let [page_area, caption_area] =
        inner_rect(area).layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    if !state.has_page(variant, page) {
        state.pane_mut(variant).canvas = Rect::default();
        frame.render_widget(
            Paragraph::new("no such page in this document").style(Style::default().fg(theme.muted)),
            page_area,
        );
        return;
    }

    let native = state.native_size(variant, page);
    let canvas = fit_page(page_area, native);
    let render = PageSize::new(f64::from(canvas.width), f64::from(canvas.height));

    let pane = state.pane_mut(variant);
    pane.canvas = canvas;
    pane.surface.resize(render);
    if pane.overlay.needs_repaint(render) {
        pane.overlay.paint(&mut pane.surface);
    }

    frame.render_widget(
        OverlayWidget { commands: pane.surface.commands(), paper: theme.page_paper },
        canvas,
    );
    if native.is_none() {
        frame.render_widget(
            Paragraph::new("loading page…").style(Style::default().fg(theme.page_text)),
            canvas,
        );
    }

    if let Some(segments) = pane.overlay.hover_caption() {
        frame.render_widget(Paragraph::new(segment_line(&segments, theme)), caption_area);
    }
}

/// Largest rect inside `area` with the page's aspect ratio, horizontally
/// centred. Without a known size the whole area is used.
pub fn fit_page(area: Rect, native: Option<PageSize>) -> Rect {
    let Some(native) = native.filter(PageSize::is_usable) else {
        return area;
    };
    if area.is_empty() {
        return area;
    }
    let rows_per_col = native.height / native.width * CELL_ASPECT;
    let mut width = f64::from(area.width);
    let mut height = width * rows_per_col;
    if height > f64::from(area.height) {
        height = f64::from(area.height);
        width = height / rows_per_col;
    }
    let width = (width.floor() as u16).clamp(1, area.width);
    let height = (height.floor() as u16).clamp(1, area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height,
    }
}

/// Replays recorded paint commands into a ratatui buffer.
///
/// Fills blend the status colour onto whatever background the cell already
/// has, so overlapping regions darken. Strokes draw a box outline; a hovered
/// region's doubled stroke width becomes a thick outline.
pub struct OverlayWidget<'a> {
    pub commands: &'a [PaintCommand],
    pub paper: Rgb,
}

impl Widget for OverlayWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let clip = area.intersection(buf.area);
        for command in self.commands {
            match command {
                PaintCommand::Clear => {
                    for y in clip.top()..clip.bottom() {
                        for x in clip.left()..clip.right() {
                            let cell = &mut buf[(x, y)];
                            cell.reset();
                            cell.set_bg(rgb(self.paper));
                        }
                    }
                }
                PaintCommand::Fill { rect, colour, opacity } => {
                    let (xs, ys) = cells(*rect, area, clip);
                    for y in ys {
                        for x in xs.clone() {
                            let cell = &mut buf[(x, y)];
                            let under = match cell.bg {
                                Color::Rgb(r, g, b) => Rgb(r, g, b),
                                _ => self.paper,
                            };
                            cell.set_bg(rgb(under.blend(*colour, *opacity)));
                        }
                    }
                }
                PaintCommand::Stroke { rect, colour, width } => {
                    stroke(buf, *rect, area, clip, *colour, *width >= 2.0);
                }
            }
        }
    }
}

/// Cell ranges covered by a render-space rect, clipped. A rect thinner than a
/// cell still covers the cell it starts in.
fn cells(rect: DiffRegion, area: Rect, clip: Rect) -> (Range<u16>, Range<u16>) {
    let span = |a0: f64, a1: f64, origin: u16, lo: u16, hi: u16| -> Range<u16> {
        let start = f64::from(origin) + a0.floor();
        let end = (f64::from(origin) + a1.ceil()).max(start + 1.0);
        let start = start.clamp(f64::from(lo), f64::from(hi)) as u16;
        let end = end.clamp(f64::from(lo), f64::from(hi)) as u16;
        start..end
    };
    (
        span(rect.x0, rect.x1, area.x, clip.left(), clip.right()),
        span(rect.y0, rect.y1, area.y, clip.top(), clip.bottom()),
    )
}

fn stroke(buf: &mut Buffer, rect: DiffRegion, area: Rect, clip: Rect, colour: Rgb, thick: bool) {
    let (xs, ys) = cells(rect, area, clip);
    if xs.is_empty() || ys.is_empty() {
        return;
    }
    let style = if thick {
        Style::default().fg(rgb(colour)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(rgb(colour))
    };
    let (h, v, tl, tr, bl, br) = if thick {
        ("━", "┃", "┏", "┓", "┗", "┛")
    } else {
        ("─", "│", "┌", "┐", "└", "┘")
    };
    let (left, right) = (xs.start, xs.end - 1);
    let (top, bottom) = (ys.start, ys.end - 1);

    // Too small for a box: colour the text instead.
    if left == right || top == bottom {
        for y in ys {
            for x in xs.clone() {
                buf[(x, y)].set_style(style);
            }
        }
        return;
    }
    for x in left..=right {
        let (t, b) = match x {
            _ if x == left => (tl, bl),
            _ if x == right => (tr, br),
            _ => (h, h),
        };
        buf[(x, top)].set_symbol(t).set_style(style);
        buf[(x, bottom)].set_symbol(b).set_style(style);
    }
    for y in top + 1..bottom {
        buf[(left, y)].set_symbol(v).set_style(style);
        buf[(right, y)].set_symbol(v).set_style(style);
    }
}
