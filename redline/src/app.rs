//! Central application state for redline.
//!
//! Owns everything the render pass reads and the input handlers mutate: the
//! loaded comparison, one overlay per document pane, the page navigator, the
//! sidebar filter and selection, and the latest review sync snapshot. The
//! review controller itself lives in `main.rs`; this module only sees the
//! snapshots it publishes.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use ratatui::layout::{Position, Rect};
use ratatui::widgets::ListState;
use redline_core::index::{by_status, ReviewIndex, StatusFilter};
use redline_core::navigator::{Gesture, NavConfig, PageNavigator};
use redline_core::overlay::{OverlayRenderer, RecordingSurface};
use redline_core::review_sync::ReviewSyncState;
use redline_core::types::{ComparisonResult, DiffRecord, DocVariant, PageSize, Point};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

use crate::event::AppEvent;

/// Wheel delta reported for one terminal scroll notch. Terminals do not report
/// magnitudes; one notch counts as a deliberate page turn.
pub const WHEEL_NOTCH: f64 = 100.0;

/// Approximate height of a terminal row in pixels, used to turn a mouse drag
/// into a swipe distance.
pub const CELL_HEIGHT_PX: f64 = 16.0;

const MIN_ZOOM: f64 = 0.25;
const MAX_ZOOM: f64 = 4.0;

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Full-screen help overlay is shown above all panels.
    Help,
}

/// Which panel currently has keyboard focus.
///
/// Cycle order: `Standard` → `Target` → `Sidebar` → `Standard`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    #[default]
    Standard,
    Target,
    Sidebar,
}

impl PanelFocus {
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Standard => PanelFocus::Sidebar,
            PanelFocus::Target => PanelFocus::Standard,
            PanelFocus::Sidebar => PanelFocus::Target,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PanelFocus::Standard => PanelFocus::Target,
            PanelFocus::Target => PanelFocus::Sidebar,
            PanelFocus::Sidebar => PanelFocus::Standard,
        }
    }

    pub fn variant(self) -> Option<DocVariant> {
        match self {
            PanelFocus::Standard => Some(DocVariant::Standard),
            PanelFocus::Target => Some(DocVariant::Target),
            PanelFocus::Sidebar => None,
        }
    }
}

impl From<DocVariant> for PanelFocus {
    fn from(variant: DocVariant) -> Self {
        match variant {
            DocVariant::Standard => PanelFocus::Standard,
            DocVariant::Target => PanelFocus::Target,
        }
    }
}

/// One document pane: its overlay and the paint commands of its last pass.
pub struct PagePane {
    pub overlay: OverlayRenderer,
    pub surface: RecordingSurface,
    /// Where the page was drawn in the last frame, in terminal cells. One
    /// cell is one render-space unit.
    pub canvas: Rect,
}

impl PagePane {
    fn new(variant: DocVariant, diffs: Arc<[DiffRecord]>, tx: &UnboundedSender<AppEvent>) -> Self {
        let mut overlay = OverlayRenderer::new(variant);
        overlay.set_diffs(diffs);
        let tx = tx.clone();
        overlay.on_diff_selected(Box::new(move |diff| {
            let _ = tx.send(AppEvent::DiffSelected(diff.element_id.clone()));
        }));
        Self {
            overlay,
            surface: RecordingSurface::new(PageSize::new(0.0, 0.0)),
            canvas: Rect::default(),
        }
    }

    /// Render-space point at the centre of the cell `(col, row)`, if the cell
    /// lies on the page canvas.
    pub fn point_at(&self, col: u16, row: u16) -> Option<Point> {
        self.canvas.contains(Position { x: col, y: row }).then(|| {
            Point::new(
                f64::from(col - self.canvas.x) + 0.5,
                f64::from(row - self.canvas.y) + 0.5,
            )
        })
    }
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    pub comparison: ComparisonResult,
    /// Shared with both overlays; never mutated after load.
    pub diffs: Arc<[DiffRecord]>,
    pub standard: PagePane,
    pub target: PagePane,
    pub navigator: PageNavigator,

    /// Active status tab in the sidebar.
    pub filter: StatusFilter,
    pub diff_list_state: ListState,
    /// `element_id` of the diff shown in the detail pane.
    pub selected_diff: Option<String>,
    /// Inner area of the sidebar diff list, cached after each render for
    /// mouse selection.
    pub diff_list_rect: Rect,

    pub review: ReviewSyncState,
    pub reviews: ReviewIndex,
    /// Attempt budget, shown next to the attempt counter.
    pub review_max_attempts: u32,

    pub zoom: f64,
    pub help_scroll: u16,

    /// Natural page sizes read from the page images.
    measured: HashMap<(DocVariant, usize), PageSize>,
    /// Pages whose size read was already started.
    requested: HashSet<(DocVariant, usize)>,
    /// Directory page image references are resolved against.
    image_root: PathBuf,
    /// Row and time of the last left-button press, for drag swipes.
    drag_start: Option<(u16, Instant)>,
}

impl AppState {
    /// Builds the state for a freshly loaded comparison, positioned on page 0.
    ///
    /// # Arguments
    ///
    /// * `comparison` — the loaded result document
    /// * `nav` — page navigator thresholds
    /// * `review_max_attempts` — polling budget, for display only
    /// * `image_root` — directory page image paths are relative to
    /// * `tx` — event sender; overlay clicks are posted as `AppEvent::DiffSelected`
    pub fn new(
        comparison: ComparisonResult,
        nav: NavConfig,
        review_max_attempts: u32,
        image_root: PathBuf,
        tx: &UnboundedSender<AppEvent>,
    ) -> Self {
        let diffs: Arc<[DiffRecord]> = Arc::from(comparison.diff_list.clone());
        let navigator = PageNavigator::new(comparison.page_count(), nav);
        let mut state = Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            standard: PagePane::new(DocVariant::Standard, Arc::clone(&diffs), tx),
            target: PagePane::new(DocVariant::Target, Arc::clone(&diffs), tx),
            comparison,
            diffs,
            navigator,
            filter: StatusFilter::default(),
            diff_list_state: ListState::default(),
            selected_diff: None,
            diff_list_rect: Rect::default(),
            review: ReviewSyncState::default(),
            reviews: ReviewIndex::default(),
            review_max_attempts,
            zoom: 1.0,
            help_scroll: 0,
            measured: HashMap::new(),
            requested: HashSet::new(),
            image_root,
            drag_start: None,
        };
        state.sync_page();
        state
    }

    pub fn page(&self) -> usize {
        self.navigator.page()
    }

    pub fn pane(&self, variant: DocVariant) -> &PagePane {
        match variant {
            DocVariant::Standard => &self.standard,
            DocVariant::Target => &self.target,
        }
    }

    pub fn pane_mut(&mut self, variant: DocVariant) -> &mut PagePane {
        match variant {
            DocVariant::Standard => &mut self.standard,
            DocVariant::Target => &mut self.target,
        }
    }

    /// Whether `variant` has an image for `page` at all. The shorter document
    /// runs out of pages before the longer one.
    pub fn has_page(&self, variant: DocVariant, page: usize) -> bool {
        page < self.comparison.images(variant).len()
    }

    /// Natural size of a page: declared in the result document, else measured.
    pub fn native_size(&self, variant: DocVariant, page: usize) -> Option<PageSize> {
        self.comparison
            .declared_size(variant, page)
            .or_else(|| self.measured.get(&(variant, page)).copied())
    }

    /// Pushes the navigator's page into both overlays.
    fn sync_page(&mut self) {
        let page = self.page();
        for variant in [DocVariant::Standard, DocVariant::Target] {
            let native = self.native_size(variant, page);
            self.pane_mut(variant).overlay.set_page(page, native);
        }
    }

    /// Feeds a navigation gesture to the navigator. Returns `true` if the page
    /// changed.
    pub fn navigate(&mut self, gesture: Gesture) -> bool {
        match self.navigator.request(gesture, Instant::now()) {
            Ok(page) => {
                debug!(page, "navigated");
                self.sync_page();
                true
            }
            Err(reason) => {
                trace!(?gesture, ?reason, "navigation rejected");
                false
            }
        }
    }

    /// Diffs listed under the active status tab, in backend order.
    pub fn visible_diffs(&self) -> Vec<&DiffRecord> {
        by_status(&self.diffs).get(self.filter).to_vec()
    }

    pub fn selected_record(&self) -> Option<&DiffRecord> {
        let id = self.selected_diff.as_deref()?;
        self.diffs.iter().find(|d| d.element_id == id)
    }

    /// Selects the diff `id`, shows its page and highlights it in the list
    /// when it is visible under the active tab.
    pub fn select_diff(&mut self, id: &str) {
        let Some(page) = self.diffs.iter().find(|d| d.element_id == id).map(|d| d.page_index)
        else {
            return;
        };
        self.selected_diff = Some(id.to_owned());
        match self.navigator.jump_to(page) {
            Ok(_) => self.sync_page(),
            Err(reason) => debug!(diff = id, page, ?reason, "selected diff is off the page range"),
        }
        self.sync_list_selection();
    }

    fn sync_list_selection(&mut self) {
        let position = self.selected_diff.as_deref().and_then(|id| {
            self.visible_diffs().iter().position(|d| d.element_id == id)
        });
        self.diff_list_state.select(position);
    }

    /// Moves the sidebar selection by `delta` rows, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        let visible = self.visible_diffs();
        if visible.is_empty() {
            return;
        }
        let target = match self.diff_list_state.selected() {
            Some(current) => current.saturating_add_signed(delta).min(visible.len() - 1),
            None if delta < 0 => visible.len() - 1,
            None => 0,
        };
        let id = visible[target].element_id.clone();
        self.select_diff(&id);
    }

    /// Selects the list row at screen `row`, if it maps to an item.
    fn select_row(&mut self, row: u16) {
        let area = self.diff_list_rect;
        if row < area.y || row >= area.y + area.height {
            return;
        }
        let index = self.diff_list_state.offset() + usize::from(row - area.y);
        let id = self.visible_diffs().get(index).map(|d| d.element_id.clone());
        if let Some(id) = id {
            self.select_diff(&id);
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        *self.diff_list_state.offset_mut() = 0;
        self.sync_list_selection();
    }

    /// Multiplies the zoom factor, clamped to 0.25–4.
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.standard.overlay.set_zoom(self.zoom);
        self.target.overlay.set_zoom(self.zoom);
    }

    pub fn apply_review_update(&mut self, state: ReviewSyncState) {
        self.reviews = ReviewIndex::new(&state.reviews);
        self.review = state;
    }

    /// Records a measured page size and hands it to the overlay if that page is
    /// on screen.
    pub fn surface_loaded(&mut self, variant: DocVariant, page: usize, size: PageSize) {
        self.measured.insert((variant, page), size);
        if page == self.page() && self.comparison.declared_size(variant, page).is_none() {
            self.pane_mut(variant).overlay.surface_loaded(size);
        }
    }

    /// Image files of the current page whose size is still unknown and not yet
    /// being measured. Each page is returned once.
    pub fn pages_to_measure(&mut self) -> Vec<(DocVariant, usize, PathBuf)> {
        let page = self.page();
        let mut out = Vec::new();
        for variant in [DocVariant::Standard, DocVariant::Target] {
            if self.native_size(variant, page).is_some()
                || self.requested.contains(&(variant, page))
            {
                continue;
            }
            if let Some(image) = self.comparison.images(variant).get(page) {
                self.requested.insert((variant, page));
                out.push((variant, page, self.image_root.join(image)));
            }
        }
        out
    }

    /// Pointer motion: updates the hover target of the pane under the
    /// pointer and clears it everywhere else.
    pub fn pointer_moved(&mut self, col: u16, row: u16) {
        for variant in [DocVariant::Standard, DocVariant::Target] {
            let pane = self.pane_mut(variant);
            match pane.point_at(col, row) {
                Some(point) => pane.overlay.pointer_moved(point),
                None => pane.overlay.pointer_left(),
            };
        }
    }

    /// Left button pressed: focuses the panel under the pointer and resolves
    /// a click on a highlighted region.
    pub fn mouse_down(&mut self, col: u16, row: u16) {
        self.drag_start = Some((row, Instant::now()));
        for variant in [DocVariant::Standard, DocVariant::Target] {
            let pane = self.pane_mut(variant);
            if let Some(point) = pane.point_at(col, row) {
                pane.overlay.click(point);
                self.focus = variant.into();
                return;
            }
        }
        if self.diff_list_rect.contains(Position { x: col, y: row }) {
            self.focus = PanelFocus::Sidebar;
            self.select_row(row);
        }
    }

    /// Left button released: a vertical drag counts as a swipe.
    pub fn mouse_up(&mut self, row: u16) {
        let Some((start_row, started)) = self.drag_start.take() else {
            return;
        };
        if start_row == row {
            return;
        }
        self.navigate(Gesture::Swipe {
            start_y: f64::from(start_row) * CELL_HEIGHT_PX,
            end_y: f64::from(row) * CELL_HEIGHT_PX,
            elapsed: started.elapsed(),
        });
    }

    /// One wheel notch at `(col, row)`: scrolls the list over the sidebar,
    /// turns the page anywhere else.
    pub fn wheel(&mut self, col: u16, row: u16, down: bool) {
        if self.diff_list_rect.contains(Position { x: col, y: row }) {
            self.move_selection(if down { 1 } else { -1 });
        } else {
            let delta_y = if down { WHEEL_NOTCH } else { -WHEEL_NOTCH };
            self.navigate(Gesture::Wheel { delta_y });
        }
    }
}
