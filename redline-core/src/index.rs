//! Classification of a diff collection and review lookup by diff id.
//!
//! `by_status` buckets keep the backend's order inside every bucket: that order
//! is the presentation order of the sidebar and must not change between
//! renders. The `all` bucket is the untouched input sequence.

use std::collections::HashMap;

use crate::types::{DiffRecord, DiffStatus, ReviewRecord};

/// Sidebar filter: one bucket per status plus the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(DiffStatus),
}

impl StatusFilter {
    /// Tab order: all, then each status.
    pub const TABS: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Only(DiffStatus::Add),
        StatusFilter::Only(DiffStatus::Delete),
        StatusFilter::Only(DiffStatus::Modify),
        StatusFilter::Only(DiffStatus::Move),
    ];

    pub fn next(self) -> Self {
        let pos = Self::TABS.iter().position(|t| *t == self).unwrap_or(0);
        Self::TABS[(pos + 1) % Self::TABS.len()]
    }

    pub fn prev(self) -> Self {
        let pos = Self::TABS.iter().position(|t| *t == self).unwrap_or(0);
        Self::TABS[(pos + Self::TABS.len() - 1) % Self::TABS.len()]
    }
}

/// Status buckets borrowing from the diff slice they were built from.
#[derive(Debug, Clone, Default)]
pub struct StatusBuckets<'a> {
    pub all: Vec<&'a DiffRecord>,
    pub add: Vec<&'a DiffRecord>,
    pub delete: Vec<&'a DiffRecord>,
    pub modify: Vec<&'a DiffRecord>,
    pub moved: Vec<&'a DiffRecord>,
}

impl<'a> StatusBuckets<'a> {
    pub fn get(&self, filter: StatusFilter) -> &[&'a DiffRecord] {
        match filter {
            StatusFilter::All => &self.all,
            StatusFilter::Only(DiffStatus::Add) => &self.add,
            StatusFilter::Only(DiffStatus::Delete) => &self.delete,
            StatusFilter::Only(DiffStatus::Modify) => &self.modify,
            StatusFilter::Only(DiffStatus::Move) => &self.moved,
        }
    }
}

/// Partitions `diffs` by status. Each diff lands in exactly one status bucket
/// and in `all`; relative order is preserved everywhere.
pub fn by_status(diffs: &[DiffRecord]) -> StatusBuckets<'_> {
    let mut buckets = StatusBuckets { all: diffs.iter().collect(), ..StatusBuckets::default() };
    for diff in diffs {
        let bucket = match diff.status {
            DiffStatus::Add => &mut buckets.add,
            DiffStatus::Delete => &mut buckets.delete,
            DiffStatus::Modify => &mut buckets.modify,
            DiffStatus::Move => &mut buckets.moved,
        };
        bucket.push(diff);
    }
    buckets
}

/// Linear lookup of the review attached to `diff_id`. Absence is not an error.
pub fn review_for<'a>(diff_id: &str, reviews: &'a [ReviewRecord]) -> Option<&'a ReviewRecord> {
    reviews.iter().find(|r| r.diff_id == diff_id)
}

/// Indexed review lookup. Built once per received batch.
///
/// When a batch carries several records for the same diff, the last one wins.
#[derive(Debug, Clone, Default)]
pub struct ReviewIndex {
    by_diff: HashMap<String, ReviewRecord>,
}

impl ReviewIndex {
    pub fn new(reviews: &[ReviewRecord]) -> Self {
        let by_diff = reviews.iter().map(|r| (r.diff_id.clone(), r.clone())).collect();
        Self { by_diff }
    }

    pub fn get(&self, diff_id: &str) -> Option<&ReviewRecord> {
        self.by_diff.get(diff_id)
    }

    pub fn len(&self) -> usize {
        self.by_diff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_diff.is_empty()
    }
}

/// Diffs anchored on `page`, in list order.
pub fn on_page(diffs: &[DiffRecord], page: usize) -> impl Iterator<Item = &DiffRecord> {
    diffs.iter().filter(move |d| d.page_index == page)
}
