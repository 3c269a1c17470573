//! Per-page highlight overlay: painting, hover emphasis, and click resolution.
//!
//! The renderer is backend-agnostic. It paints through the [`Surface`] trait;
//! the terminal viewer records commands into a [`RecordingSurface`] and replays
//! them into its frame buffer, tests inspect the recording directly.
//!
//! Repaint is driven by a dirty flag rather than by the caller guessing. Any of
//! these marks the overlay dirty:
//! - a new diff collection,
//! - a different active page,
//! - the page surface reporting its natural size,
//! - a different render size or zoom,
//! - the hover target changing.
//!
//! Every pass starts with `Surface::clear`. Regions of a previous comparison
//! can be larger than the current ones, so a partial repaint would leave them
//! behind.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::geometry::{contains_point, Transform};
use crate::index::on_page;
use crate::sentence::{highlight_segments, Segment};
use crate::style::{status_style, Rgb};
use crate::types::{DiffRecord, DiffRegion, DocVariant, PageSize, Point};

/// A drawing target in render space.
pub trait Surface {
    /// Current size of the drawable area, in render-space units.
    fn size(&self) -> PageSize;
    /// Erases everything painted so far.
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: DiffRegion, colour: Rgb, opacity: f64);
    fn stroke_rect(&mut self, rect: DiffRegion, colour: Rgb, width: f64);
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    Clear,
    Fill { rect: DiffRegion, colour: Rgb, opacity: f64 },
    Stroke { rect: DiffRegion, colour: Rgb, width: f64 },
}

/// A [`Surface`] that keeps the commands of the latest pass.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: PageSize,
    commands: Vec<PaintCommand>,
}

impl RecordingSurface {
    pub fn new(size: PageSize) -> Self {
        Self { size, commands: Vec::new() }
    }

    pub fn resize(&mut self, size: PageSize) {
        self.size = size;
    }

    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> PageSize {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(PaintCommand::Clear);
    }

    fn fill_rect(&mut self, rect: DiffRegion, colour: Rgb, opacity: f64) {
        self.commands.push(PaintCommand::Fill { rect, colour, opacity });
    }

    fn stroke_rect(&mut self, rect: DiffRegion, colour: Rgb, width: f64) {
        self.commands.push(PaintCommand::Stroke { rect, colour, width });
    }
}

/// Why a paint pass drew nothing after clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The page surface has not reported its natural size yet.
    SurfaceNotLoaded,
    /// The render surface has no area.
    EmptySurface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    Skipped(SkipReason),
    Painted { regions: usize },
}

/// Receives the diff resolved by a click.
pub type DiffSelected = Box<dyn FnMut(&DiffRecord) + Send>;

/// Page and transform of the last paint pass. `transform` is `None` when the
/// pass was skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Painted {
    render: PageSize,
    page: usize,
    transform: Option<Transform>,
}

/// Overlay state for one document variant.
pub struct OverlayRenderer {
    variant: DocVariant,
    diffs: Arc<[DiffRecord]>,
    page: usize,
    native: Option<PageSize>,
    zoom: f64,
    hovered: Option<String>,
    /// Geometry of the last completed pass. Hit-testing resolves against it
    /// until the next repaint, so clicks match what is on screen.
    painted: Option<Painted>,
    dirty: bool,
    on_select: Option<DiffSelected>,
}

impl std::fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("variant", &self.variant)
            .field("diffs", &self.diffs.len())
            .field("page", &self.page)
            .field("native", &self.native)
            .field("zoom", &self.zoom)
            .field("hovered", &self.hovered)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl OverlayRenderer {
    pub fn new(variant: DocVariant) -> Self {
        Self {
            variant,
            diffs: Arc::from(Vec::new()),
            page: 0,
            native: None,
            zoom: 1.0,
            hovered: None,
            painted: None,
            dirty: true,
            on_select: None,
        }
    }

    /// Registers the "diff selected" callback invoked by [`Self::click`].
    pub fn on_diff_selected(&mut self, callback: DiffSelected) {
        self.on_select = Some(callback);
    }

    pub fn variant(&self) -> DocVariant {
        self.variant
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn native_size(&self) -> Option<PageSize> {
        self.native
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Replaces the diff collection. Hover state from the old collection is
    /// dropped since its ids may not exist any more.
    pub fn set_diffs(&mut self, diffs: Arc<[DiffRecord]>) {
        self.diffs = diffs;
        self.hovered = None;
        self.dirty = true;
    }

    /// Switches the active page. The native size of the new page is unknown
    /// until its surface reports in via [`Self::surface_loaded`].
    pub fn set_page(&mut self, page: usize, native: Option<PageSize>) {
        if self.page != page {
            self.page = page;
            self.native = native;
            self.hovered = None;
            self.dirty = true;
        } else if let Some(size) = native {
            self.surface_loaded(size);
        }
    }

    /// The page surface finished loading and reported its natural size.
    pub fn surface_loaded(&mut self, native: PageSize) {
        if self.native != Some(native) {
            debug!(variant = ?self.variant, page = self.page, ?native, "page surface loaded");
            self.native = Some(native);
            self.dirty = true;
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 && zoom.is_finite() && (zoom - self.zoom).abs() > f64::EPSILON {
            self.zoom = zoom;
            self.dirty = true;
        }
    }

    /// True when the next frame must repaint for a surface of `render` size.
    pub fn needs_repaint(&self, render: PageSize) -> bool {
        self.dirty || self.painted.map(|p| p.render) != Some(render)
    }

    fn transform(&self, render: PageSize) -> Option<Transform> {
        Transform::new(self.native, render, self.zoom)
    }

    /// Clears `surface` and paints every region of every diff anchored on the
    /// active page.
    pub fn paint(&mut self, surface: &mut dyn Surface) -> PaintOutcome {
        let render = surface.size();
        surface.clear();
        self.dirty = false;
        let transform = self.transform(render);
        self.painted = Some(Painted { render, page: self.page, transform });

        if !render.is_usable() {
            return PaintOutcome::Skipped(SkipReason::EmptySurface);
        }
        let Some(transform) = transform else {
            trace!(variant = ?self.variant, page = self.page, "surface not loaded, skipping paint");
            return PaintOutcome::Skipped(SkipReason::SurfaceNotLoaded);
        };

        let mut regions = 0;
        for diff in on_page(&self.diffs, self.page) {
            let base = status_style(diff.status);
            let style = if self.hovered.as_deref() == Some(diff.element_id.as_str()) {
                base.hovered()
            } else {
                base
            };
            for region in diff.regions_on(self.page, self.variant) {
                let rect = transform.to_render_space(region);
                surface.fill_rect(rect, style.fill, style.fill_opacity);
                surface.stroke_rect(rect, style.stroke, style.stroke_width);
                regions += 1;
            }
        }
        trace!(variant = ?self.variant, page = self.page, regions, "overlay painted");
        PaintOutcome::Painted { regions }
    }

    /// First diff, in list order, with a region containing the render-space
    /// `point`. Overlapping regions are not re-ordered by area or depth.
    pub fn hit_test(&self, point: Point) -> Option<&DiffRecord> {
        let Painted { page, transform, .. } = self.painted?;
        let transform = transform?;
        on_page(&self.diffs, page).find(|diff| {
            diff.regions_on(page, self.variant)
                .any(|region| contains_point(point, transform.to_render_space(region)))
        })
    }

    /// Updates the hover target. Returns `true` when it changed, in which case
    /// the overlay is now dirty.
    pub fn pointer_moved(&mut self, point: Point) -> bool {
        let hit = self.hit_test(point).map(|d| d.element_id.clone());
        self.set_hovered(hit)
    }

    /// The pointer left the surface.
    pub fn pointer_left(&mut self) -> bool {
        self.set_hovered(None)
    }

    fn set_hovered(&mut self, hovered: Option<String>) -> bool {
        if self.hovered == hovered {
            return false;
        }
        self.hovered = hovered;
        self.dirty = true;
        true
    }

    /// Resolves the diff under `point` and hands it to the registered
    /// callback. Returns the resolved diff's id.
    pub fn click(&mut self, point: Point) -> Option<String> {
        let diff = self.hit_test(point)?.clone();
        debug!(variant = ?self.variant, diff = %diff.element_id, "diff clicked");
        if let Some(callback) = self.on_select.as_mut() {
            callback(&diff);
        }
        Some(diff.element_id)
    }

    /// Inline text of the hovered diff, for a caption under the page.
    pub fn hover_caption(&self) -> Option<Vec<Segment>> {
        let id = self.hovered.as_deref()?;
        self.diffs.iter().find(|d| d.element_id == id).map(highlight_segments)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{CharInfo, DiffStatus};

    fn diff(id: &str, status: DiffStatus, page: usize, polys: &[[f64; 4]]) -> DiffRecord {
        DiffRecord {
            element_id: id.into(),
            kind: "text".into(),
            status,
            page_index: page,
            elements: format!("payload {id}"),
            diff: vec![vec![CharInfo {
                text: "x".into(),
                page_index: page,
                line_index: 0,
                doc_index: None,
                char_polygons: polys.iter().map(|p| p.to_vec()).collect(),
            }]],
            full_sentence: None,
            diff_text: None,
            diff_start: None,
            diff_length: None,
            old_text: None,
            new_text: None,
        }
    }

    fn renderer(diffs: Vec<DiffRecord>) -> OverlayRenderer {
        let mut r = OverlayRenderer::new(DocVariant::Standard);
        r.set_diffs(Arc::from(diffs));
        r.surface_loaded(PageSize::new(1000.0, 1400.0));
        r
    }

    fn fills(surface: &RecordingSurface) -> Vec<(DiffRegion, f64)> {
        surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Fill { rect, opacity, .. } => Some((*rect, *opacity)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn paints_scaled_region_and_resolves_clicks() {
        let mut r = renderer(vec![diff("add-1", DiffStatus::Add, 0, &[[10.0, 10.0, 50.0, 30.0]])]);
        let mut surface = RecordingSurface::new(PageSize::new(500.0, 700.0));

        assert_eq!(r.paint(&mut surface), PaintOutcome::Painted { regions: 1 });
        assert_eq!(surface.commands()[0], PaintCommand::Clear);
        assert_eq!(fills(&surface), vec![(DiffRegion::new(5.0, 5.0, 25.0, 15.0), 0.3)]);

        assert_eq!(r.hit_test(Point::new(10.0, 10.0)).unwrap().element_id, "add-1");
        assert!(r.hit_test(Point::new(400.0, 400.0)).is_none());
    }

    #[test]
    fn only_active_page_is_painted() {
        let mut r = renderer(vec![
            diff("p0", DiffStatus::Add, 0, &[[0.0, 0.0, 10.0, 10.0]]),
            diff("p1", DiffStatus::Delete, 1, &[[0.0, 0.0, 10.0, 10.0]]),
        ]);
        let mut surface = RecordingSurface::new(PageSize::new(1000.0, 1400.0));
        r.set_page(1, Some(PageSize::new(1000.0, 1400.0)));
        r.paint(&mut surface);
        assert_eq!(fills(&surface).len(), 1);
        assert_eq!(r.hit_test(Point::new(5.0, 5.0)).unwrap().element_id, "p1");
    }

    #[test]
    fn skips_until_surface_loaded_and_still_clears() {
        let mut r = OverlayRenderer::new(DocVariant::Target);
        r.set_diffs(Arc::from(vec![diff("a", DiffStatus::Add, 0, &[[1.0, 1.0, 2.0, 2.0]])]));
        let mut surface = RecordingSurface::new(PageSize::new(100.0, 100.0));
        assert_eq!(r.paint(&mut surface), PaintOutcome::Skipped(SkipReason::SurfaceNotLoaded));
        assert_eq!(surface.commands(), &[PaintCommand::Clear]);
        assert!(!r.needs_repaint(surface.size()));

        r.surface_loaded(PageSize::new(100.0, 100.0));
        assert!(r.needs_repaint(surface.size()));
        assert_eq!(r.paint(&mut surface), PaintOutcome::Painted { regions: 1 });
    }

    #[test]
    fn zero_region_diff_is_not_an_error() {
        let mut r = renderer(vec![diff("empty", DiffStatus::Move, 0, &[])]);
        let mut surface = RecordingSurface::new(PageSize::new(10.0, 10.0));
        assert_eq!(r.paint(&mut surface), PaintOutcome::Painted { regions: 0 });
    }

    #[test]
    fn repaint_replaces_previous_comparison() {
        let mut r = renderer(vec![diff("big", DiffStatus::Add, 0, &[[0.0, 0.0, 900.0, 900.0]])]);
        let mut surface = RecordingSurface::new(PageSize::new(1000.0, 1400.0));
        r.paint(&mut surface);
        r.set_diffs(Arc::from(vec![diff("small", DiffStatus::Add, 0, &[[0.0, 0.0, 1.0, 1.0]])]));
        assert!(r.needs_repaint(surface.size()));
        r.paint(&mut surface);
        assert_eq!(fills(&surface), vec![(DiffRegion::new(0.0, 0.0, 1.0, 1.0), 0.3)]);
    }

    #[test]
    fn hover_emphasises_only_the_target() {
        let mut r = renderer(vec![
            diff("a", DiffStatus::Add, 0, &[[0.0, 0.0, 100.0, 100.0]]),
            diff("b", DiffStatus::Add, 0, &[[200.0, 200.0, 300.0, 300.0]]),
        ]);
        let mut surface = RecordingSurface::new(PageSize::new(1000.0, 1400.0));
        r.paint(&mut surface);

        assert!(r.pointer_moved(Point::new(50.0, 50.0)));
        assert!(!r.pointer_moved(Point::new(60.0, 60.0)), "same target is not a change");
        assert!(r.needs_repaint(surface.size()));
        r.paint(&mut surface);
        let opacities: Vec<f64> = fills(&surface).iter().map(|(_, o)| *o).collect();
        assert!((opacities[0] - 0.45).abs() < 1e-9);
        assert!((opacities[1] - 0.3).abs() < 1e-9);

        assert!(r.pointer_left());
        assert_eq!(r.hovered(), None);
    }

    #[test]
    fn overlapping_regions_resolve_in_list_order() {
        let mut r = renderer(vec![
            diff("first", DiffStatus::Modify, 0, &[[0.0, 0.0, 500.0, 500.0]]),
            diff("second", DiffStatus::Add, 0, &[[10.0, 10.0, 20.0, 20.0]]),
        ]);
        let mut surface = RecordingSurface::new(PageSize::new(1000.0, 1400.0));
        r.paint(&mut surface);
        assert_eq!(r.hit_test(Point::new(15.0, 15.0)).unwrap().element_id, "first");
    }

    #[test]
    fn hit_test_uses_painted_geometry_until_repaint() {
        let mut r = OverlayRenderer::new(DocVariant::Standard);
        r.set_diffs(Arc::from(vec![diff("a", DiffStatus::Add, 0, &[[0.0, 0.0, 10.0, 10.0]])]));
        r.surface_loaded(PageSize::new(100.0, 100.0));
        let mut surface = RecordingSurface::new(PageSize::new(100.0, 100.0));
        r.paint(&mut surface);

        r.set_zoom(4.0);
        assert!(r.needs_repaint(surface.size()));
        assert!(r.hit_test(Point::new(20.0, 20.0)).is_none(), "zoomed region is not on screen yet");
        assert_eq!(r.hit_test(Point::new(5.0, 5.0)).unwrap().element_id, "a");

        r.paint(&mut surface);
        assert_eq!(r.hit_test(Point::new(20.0, 20.0)).unwrap().element_id, "a");
    }

    #[test]
    fn hit_test_before_first_paint_finds_nothing() {
        let r = renderer(vec![diff("a", DiffStatus::Add, 0, &[[0.0, 0.0, 10.0, 10.0]])]);
        assert!(r.hit_test(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn click_invokes_callback() {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        let mut r = renderer(vec![diff("a", DiffStatus::Delete, 0, &[[0.0, 0.0, 10.0, 10.0]])]);
        r.on_diff_selected(Box::new(move |d| sink.lock().unwrap().push(d.element_id.clone())));
        let mut surface = RecordingSurface::new(PageSize::new(1000.0, 1400.0));
        r.paint(&mut surface);

        assert_eq!(r.click(Point::new(5.0, 5.0)).as_deref(), Some("a"));
        assert_eq!(r.click(Point::new(50.0, 50.0)), None);
        assert_eq!(*selected.lock().unwrap(), vec!["a".to_owned()]);
    }

    #[test]
    fn hover_caption_uses_inline_text() {
        let mut r = renderer(vec![diff("a", DiffStatus::Add, 0, &[[0.0, 0.0, 10.0, 10.0]])]);
        let mut surface = RecordingSurface::new(PageSize::new(1000.0, 1400.0));
        r.paint(&mut surface);
        assert!(r.hover_caption().is_none());
        r.pointer_moved(Point::new(1.0, 1.0));
        assert_eq!(r.hover_caption().unwrap(), vec![Segment::Plain("payload a".into())]);
    }
}
