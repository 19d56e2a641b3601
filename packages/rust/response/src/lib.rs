//! Response-sheet segmentation for gatecalc.
//!
//! Turns the candidate's HTML response sheet into one [`ResponseRecord`] per
//! question block:
//!
//! 1. [`flatten_html`] reduces the markup to a single normalized line with
//!    `IMG_SRC:` sentinels where option images were.
//! 2. [`scan_anchors`] finds the `Question Type / Question ID / Status` headers.
//! 3. [`segment`] pairs each anchor with its content and metadata spans.
//! 4. [`build_record`] reads chosen labels, numeric answers and the
//!    displayed-label → option-image map out of those spans.

pub mod builder;
pub mod flatten;
pub mod options;
pub mod tokenizer;

use tracing::{debug, instrument, warn};

use gatecalc_shared::ResponseRecord;

pub use builder::{Segment, build_record, segment};
pub use flatten::{IMAGE_SENTINEL, flatten_html};
pub use options::{
    FilenameSuffixStrategy, LabelledImageStrategy, OPTION_LABELS, OptionMap, OptionResolver,
    OptionStrategy, Resolution, resolve_canonical,
};
pub use tokenizer::{Anchor, Field, FieldToken, scan_anchors, scan_fields};

/// Literal every genuine response sheet carries at least once.
const SHEET_MARKER: &str = "Question Type";

/// Segment an HTML response sheet into records, in document order.
///
/// Returns an empty list when the sheet contains no question blocks.
#[instrument(skip_all, fields(html_len = html.len()))]
pub fn segment_response_document(html: &str) -> Vec<ResponseRecord> {
    let flat = flatten_html(html);
    debug!(flat_len = flat.len(), "response sheet flattened");
    segment_flattened(&flat)
}

/// Segment an already-flattened response sheet.
pub fn segment_flattened(flat: &str) -> Vec<ResponseRecord> {
    if !flat.contains(SHEET_MARKER) {
        warn!("no '{SHEET_MARKER}' marker found in response sheet");
        return Vec::new();
    }

    let anchors = scan_anchors(flat);
    let resolver = OptionResolver::new();
    let records: Vec<ResponseRecord> = segment(flat, &anchors)
        .iter()
        .map(|seg| build_record(seg, &resolver))
        .collect();

    debug!(records = records.len(), "response sheet segmented");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecalc_shared::{QuestionType, ResponseStatus};

    fn fixture(name: &str) -> String {
        let path = format!("{}/../../../fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read fixture {path}: {e}"))
    }

    #[test]
    fn segments_fixture_sheet() {
        let records = segment_response_document(&fixture("response_sheet.html"));
        assert_eq!(records.len(), 4);

        let mcq = &records[0];
        assert_eq!(mcq.question_id, 6_402_741_001);
        assert_eq!(mcq.q_type, QuestionType::Mcq);
        assert_eq!(mcq.chosen_labels, vec!['B']);
        assert_eq!(mcq.option_map.len(), 4);
        assert_eq!(resolve_canonical(&mcq.option_map, 'B'), Some('A'));

        let msq = &records[1];
        assert_eq!(msq.q_type, QuestionType::Msq);
        assert_eq!(msq.chosen_labels, vec!['A', 'C']);
        assert_eq!(resolve_canonical(&msq.option_map, 'A'), Some('B'));
        assert_eq!(resolve_canonical(&msq.option_map, 'C'), Some('D'));

        let nat = &records[2];
        assert_eq!(nat.q_type, QuestionType::Nat);
        assert_eq!(nat.given_answer, Some(10.5));

        let skipped = &records[3];
        assert_eq!(skipped.status, ResponseStatus::NotAnswered);
        assert!(skipped.chosen_labels.is_empty());
    }

    #[test]
    fn sheet_without_marker_yields_nothing() {
        assert!(segment_response_document("<html><body>Login failed</body></html>").is_empty());
        assert!(segment_flattened("").is_empty());
    }

    #[test]
    fn marker_without_anchor_yields_nothing() {
        assert!(segment_flattened("Question Type : essay").is_empty());
    }

    #[test]
    fn records_follow_document_order() {
        let flat = "Question Type : NAT Question ID : 30 Status : Answered \
                    Question Type : MCQ Question ID : 10 Status : Not Answered \
                    Question Type : MSQ Question ID : 20 Status : Marked For Review";
        let ids: Vec<u64> = segment_flattened(flat).iter().map(|r| r.question_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }
}
