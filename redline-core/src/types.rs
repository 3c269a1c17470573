//! Owned data model shared by every engine module.
//!
//! All types deserialize directly from the comparison and review backends'
//! JSON payloads. Nothing here is mutated after it is received: diff records
//! and review records are read-only for the lifetime of a viewing session.

use serde::{Deserialize, Serialize};

/// Classification of a single difference between the two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffStatus {
    #[serde(rename = "ADD")]
    Add,
    #[serde(rename = "DELETE")]
    Delete,
    /// Older backends reported modifications as `CHANGE`.
    #[serde(rename = "MODIFY", alias = "CHANGE")]
    Modify,
    #[serde(rename = "MOVE")]
    Move,
}

impl DiffStatus {
    /// All statuses in sidebar/tab order.
    pub const ALL: [DiffStatus; 4] =
        [DiffStatus::Add, DiffStatus::Delete, DiffStatus::Modify, DiffStatus::Move];
}

/// Which side of the comparison a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocVariant {
    /// The reference ("standard") document.
    #[default]
    Standard,
    /// The document under review ("target").
    Target,
}

impl DocVariant {
    /// The `doc_index` value the diff backend uses for this variant.
    pub fn doc_index(self) -> u8 {
        match self {
            DocVariant::Standard => 1,
            DocVariant::Target => 2,
        }
    }

    pub fn other(self) -> Self {
        match self {
            DocVariant::Standard => DocVariant::Target,
            DocVariant::Target => DocVariant::Standard,
        }
    }
}

/// Axis-aligned rectangle `(x0, y0, x1, y1)` in one coordinate space.
///
/// Whether the coordinates are in a page's native pixel space or in a render
/// surface's space is decided by whoever produced the value; the type does not
/// track it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiffRegion {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl DiffRegion {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Builds a region from a backend polygon. Polygons carry at least four
    /// numbers; anything shorter is not a usable rectangle.
    pub fn from_polygon(polygon: &[f64]) -> Option<Self> {
        match polygon {
            [x0, y0, x1, y1, ..] => Some(Self::new(*x0, *y0, *x1, *y1)),
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point { x: (self.x0 + self.x1) / 2.0, y: (self.y0 + self.y1) / 2.0 }
    }
}

/// A point in the same coordinate space as the regions it is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One contributing character (or element) of a diff and its polygons.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharInfo {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub page_index: usize,
    #[serde(default)]
    pub line_index: usize,
    /// `1` for the standard document, `2` for the target. Absent means the
    /// entry applies to both variants.
    #[serde(default)]
    pub doc_index: Option<u8>,
    #[serde(default)]
    pub char_polygons: Vec<Vec<f64>>,
}

impl CharInfo {
    fn belongs_to(&self, variant: DocVariant) -> bool {
        self.doc_index.is_none_or(|d| d == variant.doc_index())
    }
}

/// Surrounding sentence for highlighted-substring rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullSentence {
    pub sentence: String,
    #[serde(default)]
    pub standard_text: String,
    #[serde(default)]
    pub target_text: String,
}

/// One reported structural difference, as produced by the diff backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Unique and stable within a comparison; the key review records refer to.
    pub element_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub status: DiffStatus,
    pub page_index: usize,
    /// Raw diff payload text, shown when no sentence context exists.
    #[serde(default)]
    pub elements: String,
    /// Regions grouped by contributing character/element.
    #[serde(default)]
    pub diff: Vec<Vec<CharInfo>>,
    #[serde(default)]
    pub full_sentence: Option<FullSentence>,
    #[serde(default)]
    pub diff_text: Option<String>,
    #[serde(default)]
    pub diff_start: Option<usize>,
    #[serde(default)]
    pub diff_length: Option<usize>,
    #[serde(default)]
    pub old_text: Option<String>,
    #[serde(default)]
    pub new_text: Option<String>,
}

impl DiffRecord {
    /// Every native-space region this diff contributes to `page` of `variant`,
    /// in group order.
    pub fn regions_on(
        &self,
        page: usize,
        variant: DocVariant,
    ) -> impl Iterator<Item = DiffRegion> + '_ {
        self.diff
            .iter()
            .flatten()
            .filter(move |c| c.page_index == page && c.belongs_to(variant))
            .flat_map(|c| c.char_polygons.iter())
            .filter_map(|p| DiffRegion::from_polygon(p))
    }
}

/// Pre-aggregated counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_differences: usize,
    #[serde(default)]
    pub additions: usize,
    #[serde(default)]
    pub deletions: usize,
    #[serde(default)]
    pub modifications: usize,
    #[serde(default)]
    pub moves: usize,
}

impl Summary {
    /// Recounts a summary from the diff list itself.
    pub fn from_diffs(diffs: &[DiffRecord]) -> Self {
        let mut summary = Summary { total_differences: diffs.len(), ..Summary::default() };
        for diff in diffs {
            match diff.status {
                DiffStatus::Add => summary.additions += 1,
                DiffStatus::Delete => summary.deletions += 1,
                DiffStatus::Modify => summary.modifications += 1,
                DiffStatus::Move => summary.moves += 1,
            }
        }
        summary
    }

    pub fn count(&self, status: DiffStatus) -> usize {
        match status {
            DiffStatus::Add => self.additions,
            DiffStatus::Delete => self.deletions,
            DiffStatus::Modify => self.modifications,
            DiffStatus::Move => self.moves,
        }
    }
}

/// Natural pixel dimensions of a page surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A surface with a zero or negative dimension cannot be painted on.
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Aggregate produced once per comparison request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub comparison_id: String,
    #[serde(default)]
    pub standard_images: Vec<String>,
    #[serde(default)]
    pub target_images: Vec<String>,
    #[serde(default)]
    pub page_count: Option<usize>,
    /// Optional natural sizes, one per page, when the backend knows them.
    #[serde(default)]
    pub standard_page_sizes: Vec<PageSize>,
    #[serde(default)]
    pub target_page_sizes: Vec<PageSize>,
    #[serde(default)]
    pub diff_list: Vec<DiffRecord>,
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default)]
    pub ai_review_enabled: bool,
}

impl ComparisonResult {
    /// Number of navigable pages: the longer of the two documents.
    pub fn page_count(&self) -> usize {
        let from_images = self.standard_images.len().max(self.target_images.len());
        from_images.max(self.page_count.unwrap_or(0))
    }

    pub fn images(&self, variant: DocVariant) -> &[String] {
        match variant {
            DocVariant::Standard => &self.standard_images,
            DocVariant::Target => &self.target_images,
        }
    }

    pub fn declared_size(&self, variant: DocVariant, page: usize) -> Option<PageSize> {
        let sizes = match variant {
            DocVariant::Standard => &self.standard_page_sizes,
            DocVariant::Target => &self.target_page_sizes,
        };
        sizes.get(page).copied().filter(PageSize::is_usable)
    }

    /// The backend summary, or a recount when it was omitted.
    pub fn summary(&self) -> Summary {
        self.summary.unwrap_or_else(|| Summary::from_diffs(&self.diff_list))
    }
}

/// Ordered AI risk assessment of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Parses the backend's `低 / 中 / 高`. Anything else is treated as medium,
    /// which is the value the review backend substitutes for unknown input.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "低" => RiskLevel::Low,
            "高" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "低",
            RiskLevel::Medium => "中",
            RiskLevel::High => "高",
        }
    }
}

/// Icon class derived from the free-text compliance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compliance {
    Pass,
    Fail,
    Warning,
}

impl Compliance {
    /// `不符合` contains `符合`, so the negative verdict is checked first.
    pub fn classify(text: &str) -> Self {
        if text.contains("不符合") {
            Compliance::Fail
        } else if text.contains("符合") {
            Compliance::Pass
        } else {
            Compliance::Warning
        }
    }
}

/// AI-generated commentary for one diff, keyed by `diff_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub comparison_id: String,
    pub diff_id: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub compliance: String,
    #[serde(default)]
    pub review_suggestions: String,
    #[serde(default)]
    pub raw_ai_response: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ReviewRecord {
    pub fn risk(&self) -> RiskLevel {
        RiskLevel::parse(&self.risk_level)
    }

    pub fn compliance_class(&self) -> Compliance {
        Compliance::classify(&self.compliance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_alias_reads_as_modify() {
        let status: DiffStatus = serde_json::from_str("\"CHANGE\"").unwrap();
        assert_eq!(status, DiffStatus::Modify);
    }

    #[test]
    fn short_polygons_are_skipped() {
        assert!(DiffRegion::from_polygon(&[1.0, 2.0, 3.0]).is_none());
        let r = DiffRegion::from_polygon(&[1.0, 2.0, 3.0, 4.0, 9.0]).unwrap();
        assert_eq!(r, DiffRegion::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn regions_filter_by_page_and_variant() {
        let json = r#"{
            "element_id": "d1",
            "status": "ADD",
            "page_index": 0,
            "diff": [[
                {"text": "a", "page_index": 0, "doc_index": 1, "char_polygons": [[1,1,2,2]]},
                {"text": "b", "page_index": 0, "doc_index": 2, "char_polygons": [[3,3,4,4]]},
                {"text": "c", "page_index": 1, "char_polygons": [[5,5,6,6]]},
                {"text": "d", "page_index": 0, "char_polygons": [[7,7,8,8], [1]]}
            ]]
        }"#;
        let diff: DiffRecord = serde_json::from_str(json).unwrap();
        let standard: Vec<_> = diff.regions_on(0, DocVariant::Standard).collect();
        assert_eq!(
            standard,
            vec![DiffRegion::new(1.0, 1.0, 2.0, 2.0), DiffRegion::new(7.0, 7.0, 8.0, 8.0)]
        );
        let target: Vec<_> = diff.regions_on(0, DocVariant::Target).collect();
        assert_eq!(target.len(), 2);
        assert_eq!(diff.regions_on(1, DocVariant::Target).count(), 1);
    }

    #[test]
    fn risk_levels_are_ordered_and_default_to_medium() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::parse("高"), RiskLevel::High);
        assert_eq!(RiskLevel::parse("unknown"), RiskLevel::Medium);
    }

    #[test]
    fn compliance_classification() {
        assert_eq!(Compliance::classify("符合"), Compliance::Pass);
        assert_eq!(Compliance::classify("部分符合"), Compliance::Pass);
        assert_eq!(Compliance::classify("不符合"), Compliance::Fail);
        assert_eq!(Compliance::classify("需人工确认"), Compliance::Warning);
    }

    #[test]
    fn summary_recount_and_page_count() {
        let result: ComparisonResult = serde_json::from_str(
            r#"{
                "comparison_id": "c1",
                "standard_images": ["a.png", "b.png"],
                "target_images": ["a.png", "b.png", "c.png"],
                "diff_list": [
                    {"element_id": "1", "status": "ADD", "page_index": 0},
                    {"element_id": "2", "status": "MOVE", "page_index": 2}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(result.page_count(), 3);
        let summary = result.summary();
        assert_eq!(summary.total_differences, 2);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.moves, 1);
        assert!(!result.ai_review_enabled);
    }
}
