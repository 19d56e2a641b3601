//! Record assembly: anchors + field tokens → [`ResponseRecord`]s.
//!
//! Each anchor owns two views of the flattened sheet:
//!
//! ```text
//! ... [anchor i-1][ content(i) ][anchor i][ trailer(i) ][anchor i+1] ...
//!                               |<----- metadata(i) --->|
//! ```
//!
//! `content(i)` is the text between the previous anchor's end and this
//! anchor's start; it carries the option images and numeric answer rendered
//! for this question. `metadata(i)` runs from this anchor to the next one and
//! carries the chosen-option line. `content(i + 1)` is exactly `trailer(i)`.

use std::ops::Range;

use gatecalc_shared::{QuestionType, ResponseRecord};

use crate::options::OptionResolver;
use crate::tokenizer::{Anchor, Field, FieldToken, scan_fields};

/// One anchor with its content and metadata spans.
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    pub anchor: &'a Anchor,
    text: &'a str,
    content: Range<usize>,
    metadata: Range<usize>,
}

impl<'a> Segment<'a> {
    /// Material between the previous anchor (or document start) and this anchor.
    pub fn content(&self) -> &'a str {
        &self.text[self.content.clone()]
    }

    /// This anchor through to the next anchor (or document end).
    pub fn metadata(&self) -> &'a str {
        &self.text[self.metadata.clone()]
    }

    /// The anchor text itself.
    pub fn anchor_text(&self) -> &'a str {
        &self.text[self.anchor.span.clone()]
    }

    /// The part of the metadata span after the anchor text.
    pub fn trailer(&self) -> &'a str {
        &self.text[self.anchor.span.end..self.metadata.end]
    }
}

/// Pair each anchor with its spans in `text`. Anchors must be in document order.
pub fn segment<'a>(text: &'a str, anchors: &'a [Anchor]) -> Vec<Segment<'a>> {
    anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| {
            let prev_end = if i > 0 { anchors[i - 1].span.end } else { 0 };
            let next_start = anchors.get(i + 1).map_or(text.len(), |next| next.span.start);
            Segment {
                anchor,
                text,
                content: prev_end..anchor.span.start,
                metadata: anchor.span.start..next_start,
            }
        })
        .collect()
}

/// Build the response record for one segment.
///
/// Unresolvable parts degrade to empty values rather than failing: no chosen
/// option gives no labels, an unparseable answer gives `None`.
pub fn build_record(segment: &Segment<'_>, resolver: &OptionResolver) -> ResponseRecord {
    let anchor = segment.anchor;
    let content_fields = scan_fields(segment.content());
    let metadata_fields = scan_fields(segment.metadata());

    let mut record = ResponseRecord {
        question_id: anchor.question_id,
        q_type: anchor.q_type.clone(),
        status: anchor.status,
        chosen_labels: Vec::new(),
        given_answer: None,
        option_map: Default::default(),
    };

    match anchor.q_type {
        QuestionType::Mcq | QuestionType::Msq => {
            record.chosen_labels = first_chosen(&metadata_fields).unwrap_or_default();
            record.option_map = resolver.resolve_fields(&content_fields);
        }
        QuestionType::Nat => {
            record.given_answer = first_given(&content_fields)
                .or_else(|| first_given(&metadata_fields))
                .flatten();
        }
        QuestionType::Other(_) => {}
    }

    record
}

fn first_chosen(fields: &[Field]) -> Option<Vec<char>> {
    fields.iter().find_map(|f| match &f.token {
        FieldToken::ChosenOption { labels } => Some(labels.clone()),
        _ => None,
    })
}

/// `Some(value)` for the first given-answer token; the inner `None` marks an unparseable one.
fn first_given(fields: &[Field]) -> Option<Option<f64>> {
    fields.iter().find_map(|f| match &f.token {
        FieldToken::GivenAnswer { value, .. } => Some(*value),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::scan_anchors;
    use gatecalc_shared::ResponseStatus;

    const SHEET: &str = "Header A. IMG_SRC:/q/1b.png B. IMG_SRC:/q/1d.png \
        C. IMG_SRC:/q/1a.png D. IMG_SRC:/q/1c.png \
        Question Type : MCQ Question ID : 101 Status : Answered Chosen Option : C \
        Given Answer : 10.25 \
        Question Type : NAT Question ID : 102 Status : Answered \
        Question Type : MSQ Question ID : 103 Status : Not Answered Chosen Option : --";

    #[test]
    fn spans_follow_anchor_layout() {
        let anchors = scan_anchors(SHEET);
        let segments = segment(SHEET, &anchors);
        assert_eq!(segments.len(), 3);

        assert!(segments[0].content().starts_with("Header"));
        assert!(segments[0].metadata().starts_with("Question Type : MCQ"));
        assert!(segments[0].metadata().contains("Chosen Option : C"));
        assert_eq!(segments[1].content(), segments[0].trailer());
        assert!(segments[2].metadata().ends_with("Chosen Option : --"));
    }

    #[test]
    fn spans_partition_the_text() {
        let anchors = scan_anchors(SHEET);
        let segments = segment(SHEET, &anchors);

        let mut rebuilt = String::from(segments[0].content());
        for seg in &segments {
            rebuilt.push_str(seg.anchor_text());
            rebuilt.push_str(seg.trailer());
        }
        assert_eq!(rebuilt, SHEET);

        for pair in segments.windows(2) {
            assert_eq!(pair[1].content(), pair[0].trailer());
        }
    }

    #[test]
    fn builds_mcq_record() {
        let anchors = scan_anchors(SHEET);
        let segments = segment(SHEET, &anchors);
        let record = build_record(&segments[0], &OptionResolver::new());

        assert_eq!(record.question_id, 101);
        assert_eq!(record.q_type, QuestionType::Mcq);
        assert_eq!(record.status, ResponseStatus::Answered);
        assert_eq!(record.chosen_labels, vec!['C']);
        assert_eq!(record.option_map.get(&'C').map(String::as_str), Some("/q/1a.png"));
        assert_eq!(record.given_answer, None);
    }

    #[test]
    fn nat_answer_comes_from_preceding_content() {
        let anchors = scan_anchors(SHEET);
        let segments = segment(SHEET, &anchors);
        let record = build_record(&segments[1], &OptionResolver::new());

        assert_eq!(record.q_type, QuestionType::Nat);
        assert_eq!(record.given_answer, Some(10.25));
        assert!(record.option_map.is_empty());
        assert!(record.chosen_labels.is_empty());
    }

    #[test]
    fn nat_answer_falls_back_to_metadata() {
        let text = "Question Type : NAT Question ID : 5 Status : Answered Given Answer : -3";
        let anchors = scan_anchors(text);
        let segments = segment(text, &anchors);
        let record = build_record(&segments[0], &OptionResolver::new());
        assert_eq!(record.given_answer, Some(-3.0));
    }

    #[test]
    fn content_answer_wins_over_metadata() {
        let text = "Given Answer : 7.5 \
            Question Type : NAT Question ID : 6 Status : Answered Given Answer : 99";
        let anchors = scan_anchors(text);
        let segments = segment(text, &anchors);
        assert!(segments[0].content().contains("7.5"));
        assert!(segments[0].metadata().contains("99"));

        let record = build_record(&segments[0], &OptionResolver::new());
        assert_eq!(record.given_answer, Some(7.5));
    }

    #[test]
    fn unanswered_msq_has_no_labels() {
        let anchors = scan_anchors(SHEET);
        let segments = segment(SHEET, &anchors);
        let record = build_record(&segments[2], &OptionResolver::new());

        assert_eq!(record.status, ResponseStatus::NotAnswered);
        assert!(record.chosen_labels.is_empty());
        assert!(record.option_map.is_empty());
    }
}
