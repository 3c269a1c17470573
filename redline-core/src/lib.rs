//! Engine behind the redline document comparison viewer.
//!
//! The crate maps diff regions from page-image space onto a render surface,
//! paints and hit-tests them, indexes diffs and their AI reviews, drives the
//! bounded review polling sequence, and debounces page navigation. It has no
//! opinion about the terminal or any other front end: painting goes through
//! [`overlay::Surface`], reviews come from a [`review_sync::ReviewSource`].

pub mod client;
pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod navigator;
pub mod overlay;
pub mod review_sync;
pub mod sentence;
pub mod style;
pub mod types;

use std::path::Path;

use tracing::{info, warn};

use crate::error::LoadError;
use crate::types::{ComparisonResult, Summary};

/// Reads a comparison result document from `path`.
///
/// A backend summary that disagrees with a recount of `diff_list` is kept as
/// delivered and logged at warn level.
///
/// # Errors
///
/// Returns [`LoadError::Read`] if the file cannot be read and
/// [`LoadError::Parse`] if it is not a valid comparison result.
pub fn load_comparison(path: &Path) -> Result<ComparisonResult, LoadError> {
    let raw = std::fs::read(path)
        .map_err(|source| LoadError::Read { path: path.to_owned(), source })?;
    let result: ComparisonResult = serde_json::from_slice(&raw)
        .map_err(|source| LoadError::Parse { path: path.to_owned(), source })?;

    let recount = Summary::from_diffs(&result.diff_list);
    if let Some(summary) = result.summary {
        if summary != recount {
            warn!(?summary, ?recount, "comparison summary disagrees with diff list");
        }
    }
    info!(
        comparison = %result.comparison_id,
        pages = result.page_count(),
        diffs = result.diff_list.len(),
        ai_review = result.ai_review_enabled,
        "comparison loaded"
    );
    Ok(result)
}
