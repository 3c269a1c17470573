//! Native-space to render-space coordinate mapping.
//!
//! Regions arrive in the pixel space of the rasterised page image. A render
//! surface shows that page at some other size and zoom, so every paint and every
//! hit-test goes through the same transform. The X and Y scale factors are
//! independent: a surface that does not preserve the page aspect ratio still
//! maps regions onto the right cells.

use crate::types::{DiffRegion, PageSize, Point};

/// Scale factors from native page space to a render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub sy: f64,
}

impl Transform {
    /// Computes `sx = (render_w / native_w) * zoom` and the matching `sy`.
    ///
    /// Returns `None` while the native size is unknown (the page surface has not
    /// finished loading) or when any dimension is degenerate. Callers defer the
    /// paint pass and re-run it on the surface-ready event.
    pub fn new(native: Option<PageSize>, render: PageSize, zoom: f64) -> Option<Self> {
        let native = native?;
        if !native.is_usable() || !render.is_usable() || zoom <= 0.0 || !zoom.is_finite() {
            return None;
        }
        Some(Self {
            sx: (render.width / native.width) * zoom,
            sy: (render.height / native.height) * zoom,
        })
    }

    /// Maps a native-space region into render space.
    pub fn to_render_space(&self, region: DiffRegion) -> DiffRegion {
        DiffRegion {
            x0: region.x0 * self.sx,
            y0: region.y0 * self.sy,
            x1: region.x1 * self.sx,
            y1: region.y1 * self.sy,
        }
    }

    /// Maps a render-space point back into native space.
    pub fn to_native_point(&self, point: Point) -> Point {
        Point { x: point.x / self.sx, y: point.y / self.sy }
    }
}

/// Free-function form of [`Transform::to_render_space`].
///
/// Returns `None` under the same conditions as [`Transform::new`].
pub fn to_render_space(
    region: DiffRegion,
    native: Option<PageSize>,
    render: PageSize,
    zoom: f64,
) -> Option<DiffRegion> {
    Transform::new(native, render, zoom).map(|t| t.to_render_space(region))
}

/// Closed-interval containment. `point` and `region` must be in the same space.
pub fn contains_point(point: Point, region: DiffRegion) -> bool {
    point.x >= region.x0 && point.x <= region.x1 && point.y >= region.y0 && point.y <= region.y1
}
