//! Token grammar for flattened response sheets.
//!
//! The flattened sheet is a single line. Two token classes are recognized:
//!
//! **Anchors** open a question block:
//!
//! ```text
//! Question Type : <MCQ|MSQ|NAT> Question ID : <digits> Status : <status phrase>
//! ```
//!
//! where the status phrase is one of `Not Attempted and Marked For Review`,
//! `Marked For Review`, `Not Answered`, `Answered` (tried in that order).
//!
//! **Fields** are scanned inside a span of text between anchors:
//!
//! ```text
//! ChosenOption   := "Chosen Option :" <A-D> ("," <A-D>)*
//! GivenAnswer    := "Given Answer :" [+-]? <digits> ("." <digits>)?
//! LabelledImage  := <A-D> "." "IMG_SRC:" <non-space>+
//! Image          := "IMG_SRC:" <non-space>+
//! ```
//!
//! Whitespace between grammar elements is optional and keywords, labels and
//! type names are matched case-insensitively. Field kinds are scanned
//! independently, so an `Image` token may sit inside a `LabelledImage`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use gatecalc_shared::{QuestionType, ResponseStatus};

use crate::flatten::IMAGE_SENTINEL;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Question\s*Type\s*:\s*(MCQ|MSQ|NAT)\s*Question\s*ID\s*:\s*(\d+)\s*Status\s*:\s*(Not Attempted and Marked For Review|Marked For Review|Not Answered|Answered)",
    )
    .expect("anchor regex")
});

static CHOSEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Chosen\s*Option\s*:\s*([A-D](?:\s*,\s*[A-D])*)").expect("chosen option regex")
});

static GIVEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Given\s*Answer\s*:\s*([-+]?\d+(?:\.\d+)?)").expect("given answer regex")
});

static LABELLED_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)([A-D])\s*\.\s*{}(\S+)",
        regex::escape(IMAGE_SENTINEL)
    ))
    .expect("labelled image regex")
});

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}(\S+)", regex::escape(IMAGE_SENTINEL))).expect("image regex")
});

// ---------------------------------------------------------------------------
// Anchors
// ---------------------------------------------------------------------------

/// The fixed-format header opening one question block.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub q_type: QuestionType,
    pub question_id: u64,
    pub status: ResponseStatus,
    /// Byte range of the anchor text in the flattened sheet.
    pub span: Range<usize>,
}

/// Find every anchor in `text`, in document order.
pub fn scan_anchors(text: &str) -> Vec<Anchor> {
    ANCHOR_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let Ok(question_id) = caps[2].parse::<u64>() else {
                warn!(id = &caps[2], "question ID out of range, anchor skipped");
                return None;
            };
            let status = ResponseStatus::from_phrase(&caps[3])?;
            Some(Anchor {
                q_type: QuestionType::parse(&caps[1]),
                question_id,
                status,
                span: whole.range(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// A field recognized inside a span of the flattened sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldToken {
    /// Option labels the candidate selected, upper-cased, in sheet order.
    ChosenOption { labels: Vec<char> },
    /// A numeric answer; `value` is `None` when the digits do not parse.
    GivenAnswer { raw: String, value: Option<f64> },
    /// An option image printed right after its displayed label.
    LabelledImage { label: char, src: String },
    /// Any embedded image reference.
    Image { src: String },
}

/// A field token with its byte range inside the scanned span.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub token: FieldToken,
    pub span: Range<usize>,
}

/// Scan `text` for every field token, ordered by start offset.
pub fn scan_fields(text: &str) -> Vec<Field> {
    let mut fields: Vec<Field> = Vec::new();

    for caps in CHOSEN_RE.captures_iter(text) {
        let labels = caps[1]
            .split(',')
            .filter_map(|part| part.trim().chars().next())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        fields.push(field(&caps, FieldToken::ChosenOption { labels }));
    }

    for caps in GIVEN_RE.captures_iter(text) {
        let raw = caps[1].to_string();
        let value = raw.parse::<f64>().ok();
        fields.push(field(&caps, FieldToken::GivenAnswer { raw, value }));
    }

    for caps in LABELLED_IMAGE_RE.captures_iter(text) {
        let label = caps[1]
            .chars()
            .next()
            .map_or('?', |c| c.to_ascii_uppercase());
        let src = caps[2].to_string();
        fields.push(field(&caps, FieldToken::LabelledImage { label, src }));
    }

    for caps in IMAGE_RE.captures_iter(text) {
        let src = caps[1].to_string();
        fields.push(field(&caps, FieldToken::Image { src }));
    }

    fields.sort_by_key(|f| f.span.start);
    fields
}

fn field(caps: &regex::Captures<'_>, token: FieldToken) -> Field {
    let span = caps.get(0).map_or(0..0, |m| m.range());
    Field { token, span }
}
