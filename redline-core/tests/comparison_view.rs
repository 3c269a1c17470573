//! Integration test for a loaded comparison driving the overlay and navigator.
//!
//! Exercises: load_comparison, by_status, OverlayRenderer paint/click over a
//! RecordingSurface, PageNavigator gestures and jumps.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use redline_core::error::LoadError;
use redline_core::index::{by_status, review_for, StatusFilter};
use redline_core::load_comparison;
use redline_core::navigator::{Gesture, NavConfig, NavKey, PageNavigator, Rejected};
use redline_core::overlay::{OverlayRenderer, PaintCommand, PaintOutcome, RecordingSurface};
use redline_core::types::{DiffRegion, DiffStatus, DocVariant, PageSize, Point, ReviewRecord};

const RESULT: &str = r#"{
    "comparison_id": "cmp-42",
    "standard_images": ["std-0.png", "std-1.png"],
    "target_images": ["tgt-0.png", "tgt-1.png"],
    "standard_page_sizes": [{"width": 1000, "height": 1400}, {"width": 1000, "height": 1400}],
    "ai_review_enabled": true,
    "diff_list": [
        {
            "element_id": "add-1",
            "type": "text",
            "status": "ADD",
            "page_index": 0,
            "elements": "新增条款",
            "diff": [[{"text": "新", "page_index": 0, "line_index": 3, "doc_index": 1,
                       "char_polygons": [[10, 10, 50, 30]]}]]
        },
        {
            "element_id": "chg-1",
            "type": "text",
            "status": "CHANGE",
            "page_index": 1,
            "elements": "30 -> 60",
            "diff": [[{"text": "6", "page_index": 1, "line_index": 0, "doc_index": 1,
                       "char_polygons": [[100, 100, 200, 140]]}]]
        }
    ],
    "summary": {
        "total_differences": 2, "additions": 1, "deletions": 0, "modifications": 1, "moves": 0
    }
}"#;

fn write_result(json: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");
    std::fs::write(&path, json).unwrap();
    (dir, path)
}

#[test]
fn two_page_comparison_paints_and_resolves_clicks() {
    let (_dir, path) = write_result(RESULT);
    let result = load_comparison(&path).unwrap();
    assert_eq!(result.page_count(), 2);
    assert_eq!(result.summary().modifications, 1);

    let selected = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&selected);
    let mut overlay = OverlayRenderer::new(DocVariant::Standard);
    overlay.on_diff_selected(Box::new(move |d| *sink.lock().unwrap() = Some(d.element_id.clone())));
    overlay.set_diffs(Arc::from(result.diff_list.clone()));
    overlay.set_page(0, result.declared_size(DocVariant::Standard, 0));

    let mut surface = RecordingSurface::new(PageSize::new(500.0, 700.0));
    assert_eq!(overlay.paint(&mut surface), PaintOutcome::Painted { regions: 1 });
    let painted: Vec<DiffRegion> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            PaintCommand::Fill { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(painted, vec![DiffRegion::new(5.0, 5.0, 25.0, 15.0)]);

    assert_eq!(overlay.click(Point::new(10.0, 10.0)).as_deref(), Some("add-1"));
    assert_eq!(overlay.click(Point::new(400.0, 400.0)), None);
    assert_eq!(selected.lock().unwrap().as_deref(), Some("add-1"));
}

#[test]
fn selecting_a_diff_jumps_to_its_page() {
    let (_dir, path) = write_result(RESULT);
    let result = load_comparison(&path).unwrap();
    let buckets = by_status(&result.diff_list);
    let modified = buckets.get(StatusFilter::Only(DiffStatus::Modify));
    assert_eq!(modified.len(), 1);

    let t0 = Instant::now();
    let mut nav = PageNavigator::new(result.page_count(), NavConfig::default());
    nav.request(Gesture::Key(NavKey::Down), t0).unwrap();
    nav.jump_to(0).unwrap();
    assert_eq!(nav.jump_to(modified[0].page_index), Ok(1));

    // Still inside the cool-down of the key press.
    assert_eq!(
        nav.request(Gesture::Key(NavKey::Up), t0 + Duration::from_millis(10)),
        Err(Rejected::Transitioning)
    );

    let mut overlay = OverlayRenderer::new(DocVariant::Standard);
    overlay.set_diffs(Arc::from(result.diff_list.clone()));
    overlay.set_page(nav.page(), None);
    let mut surface = RecordingSurface::new(PageSize::new(1000.0, 1400.0));
    assert!(matches!(overlay.paint(&mut surface), PaintOutcome::Skipped(_)));
    overlay.surface_loaded(PageSize::new(1000.0, 1400.0));
    assert_eq!(overlay.paint(&mut surface), PaintOutcome::Painted { regions: 1 });
    assert_eq!(overlay.hit_test(Point::new(150.0, 120.0)).unwrap().element_id, "chg-1");
}

#[test]
fn target_variant_has_no_standard_only_regions() {
    let (_dir, path) = write_result(RESULT);
    let result = load_comparison(&path).unwrap();
    let mut overlay = OverlayRenderer::new(DocVariant::Target);
    overlay.set_diffs(Arc::from(result.diff_list));
    overlay.surface_loaded(PageSize::new(1000.0, 1400.0));
    let mut surface = RecordingSurface::new(PageSize::new(500.0, 700.0));
    assert_eq!(overlay.paint(&mut surface), PaintOutcome::Painted { regions: 0 });
}

#[test]
fn reviews_attach_by_diff_id() {
    let reviews: Vec<ReviewRecord> = serde_json::from_str(
        r#"[{"comparison_id": "cmp-42", "diff_id": "chg-1", "risk_level": "高",
             "compliance": "不符合", "review_suggestions": "付款期限延长"}]"#,
    )
    .unwrap();
    assert!(review_for("add-1", &reviews).is_none());
    assert_eq!(review_for("chg-1", &reviews).unwrap().review_suggestions, "付款期限延长");
}

#[test]
fn load_errors_name_the_file() {
    let (_dir, path) = write_result("{ not json");
    let err = load_comparison(&path).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
    assert!(err.to_string().contains("result.json"));

    let missing = path.with_file_name("missing.json");
    assert!(matches!(load_comparison(&missing), Err(LoadError::Read { .. })));
}
