//! Page image size reader.
//!
//! The result document may omit natural page sizes. For those pages the image
//! header is read on a blocking thread and the size is posted back as
//! `AppEvent::SurfaceLoaded`. Until then the overlay for that page stays
//! unpainted.

use std::path::{Path, PathBuf};

use redline_core::types::{DocVariant, PageSize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::event::AppEvent;

/// Reads the pixel size of the image at `path` without decoding it.
pub fn read_page_size(path: &Path) -> Option<PageSize> {
    match imagesize::size(path) {
        Ok(size) => {
            debug!(
                path = %path.display(),
                width = size.width,
                height = size.height,
                "page image size"
            );
            Some(PageSize::new(size.width as f64, size.height as f64))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read page image size");
            None
        }
    }
}

/// Reads the size of `path` off the event loop and posts it for `(variant, page)`.
/// A failed read is logged and leaves the page unpainted.
pub fn spawn_size_read(
    tx: UnboundedSender<AppEvent>,
    variant: DocVariant,
    page: usize,
    path: PathBuf,
) {
    tokio::task::spawn_blocking(move || {
        if let Some(size) = read_page_size(&path).filter(PageSize::is_usable) {
            let _ = tx.send(AppEvent::SurfaceLoaded { variant, page, size });
        }
    });
}
