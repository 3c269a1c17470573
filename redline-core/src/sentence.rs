//! Inline text for a diff: the changed span highlighted inside its sentence.
//!
//! Offsets from the diff backend count characters, not bytes, so all slicing
//! here goes through `char_indices`.

use crate::types::{DiffRecord, DiffStatus};

/// One run of inline text with its presentation role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Unstyled context text.
    Plain(String),
    /// The changed span, styled with the diff status colour.
    Highlight(DiffStatus, String),
    /// MODIFY only: the old text, struck through.
    Removed(String),
    /// MODIFY only: the replacement text.
    Inserted(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(t)
            | Segment::Highlight(_, t)
            | Segment::Removed(t)
            | Segment::Inserted(t) => t,
        }
    }
}

/// Splits `s` at character offsets `start` and `end`, clamped to its length.
fn split_chars(s: &str, start: usize, end: usize) -> (&str, &str, &str) {
    let byte_at = |n: usize| s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);
    let start_b = byte_at(start);
    let end_b = byte_at(end.max(start));
    (&s[..start_b], &s[start_b..end_b], &s[end_b..])
}

/// Builds the inline segments for `diff`.
///
/// Without sentence context the raw payload text is returned unstyled. With
/// it, MODIFY records that carry both old and new text render a before/after
/// substitution; everything else highlights the span in place.
pub fn highlight_segments(diff: &DiffRecord) -> Vec<Segment> {
    let Some(full) = diff.full_sentence.as_ref() else {
        return vec![Segment::Plain(diff.elements.clone())];
    };

    let start = diff.diff_start.unwrap_or(0);
    let end = start.saturating_add(diff.diff_length.unwrap_or(0));
    let (before, span, after) = split_chars(&full.sentence, start, end);

    let mut out = Vec::with_capacity(4);
    if !before.is_empty() {
        out.push(Segment::Plain(before.to_owned()));
    }
    match (diff.status, diff.old_text.as_deref(), diff.new_text.as_deref()) {
        (DiffStatus::Modify, Some(old), Some(new)) if !old.is_empty() && !new.is_empty() => {
            out.push(Segment::Removed(old.to_owned()));
            out.push(Segment::Inserted(new.to_owned()));
        }
        _ => out.push(Segment::Highlight(diff.status, span.to_owned())),
    }
    if !after.is_empty() {
        out.push(Segment::Plain(after.to_owned()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FullSentence;

    fn record(status: DiffStatus) -> DiffRecord {
        DiffRecord {
            element_id: "d".into(),
            kind: "text".into(),
            status,
            page_index: 0,
            elements: "raw payload".into(),
            diff: Vec::new(),
            full_sentence: None,
            diff_text: None,
            diff_start: None,
            diff_length: None,
            old_text: None,
            new_text: None,
        }
    }

    #[test]
    fn falls_back_to_raw_payload() {
        let segs = highlight_segments(&record(DiffStatus::Modify));
        assert_eq!(segs, vec![Segment::Plain("raw payload".into())]);
    }

    #[test]
    fn highlights_span_by_character_offsets() {
        let mut d = record(DiffStatus::Add);
        d.full_sentence = Some(FullSentence {
            sentence: "甲方应于三十日内付款".into(),
            ..FullSentence::default()
        });
        d.diff_start = Some(4);
        d.diff_length = Some(3);
        assert_eq!(
            highlight_segments(&d),
            vec![
                Segment::Plain("甲方应于".into()),
                Segment::Highlight(DiffStatus::Add, "三十日".into()),
                Segment::Plain("内付款".into()),
            ]
        );
    }

    #[test]
    fn modify_renders_before_and_after() {
        let mut d = record(DiffStatus::Modify);
        d.full_sentence = Some(FullSentence {
            sentence: "pay within 30 days".into(),
            ..FullSentence::default()
        });
        d.diff_start = Some(11);
        d.diff_length = Some(2);
        d.old_text = Some("30".into());
        d.new_text = Some("60".into());
        let segs = highlight_segments(&d);
        assert_eq!(
            segs,
            vec![
                Segment::Plain("pay within ".into()),
                Segment::Removed("30".into()),
                Segment::Inserted("60".into()),
                Segment::Plain(" days".into()),
            ]
        );
    }

    #[test]
    fn out_of_range_offsets_are_clamped() {
        let mut d = record(DiffStatus::Delete);
        d.full_sentence = Some(FullSentence { sentence: "abc".into(), ..FullSentence::default() });
        d.diff_start = Some(2);
        d.diff_length = Some(10);
        assert_eq!(
            highlight_segments(&d),
            vec![Segment::Plain("ab".into()), Segment::Highlight(DiffStatus::Delete, "c".into())]
        );
    }

    #[test]
    fn huge_offsets_do_not_overflow() {
        let d: DiffRecord = serde_json::from_str(
            r#"{"element_id": "d", "status": "DELETE", "page_index": 0,
                "full_sentence": {"sentence": "abc"},
                "diff_start": 18446744073709551615, "diff_length": 10}"#,
        )
        .unwrap();
        assert_eq!(
            highlight_segments(&d),
            vec![
                Segment::Plain("abc".into()),
                Segment::Highlight(DiffStatus::Delete, String::new()),
            ]
        );
    }
}
