//! Mark-scheme recovery from question-paper prose.
//!
//! Question papers announce their mark bands in sentences such as
//! `Q.11 – Q.35 Carry ONE mark Each`. Bands are applied in page order with
//! last-write-wins; any question number still unassigned afterwards takes its
//! value from the injected [`FallbackPolicy`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use gatecalc_shared::{FallbackPolicy, MarkTable, TextDocument};

/// Matches `Q.<start> – Q.<end> Carry <ONE|TWO> mark(s) Each`.
static BAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Q\.\s*(\d+)\s*[–-]\s*Q\.\s*(\d+)\s*Carry\s*(ONE|TWO)\s*marks?\s*Each")
        .expect("mark band regex")
});

/// One mark-band sentence found in the paper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkDeclaration {
    pub start: u32,
    pub end: u32,
    pub marks: f64,
}

/// Find every mark-band declaration in `text`, in order of appearance.
pub fn find_mark_declarations(text: &str) -> Vec<MarkDeclaration> {
    BAND_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let start = caps[1].parse::<u32>().ok()?;
            let end = caps[2].parse::<u32>().ok()?;
            let marks = mark_word_value(&caps[3])?;
            Some(MarkDeclaration { start, end, marks })
        })
        .collect()
}

/// Build the mark table for questions `1..=total_questions`.
///
/// The result always holds exactly `total_questions` entries: declared bands
/// first (later pages overwrite earlier ones), then the fallback policy for
/// every number left unassigned.
#[instrument(skip_all, fields(pages = paper.pages.len(), total_questions))]
pub fn resolve_mark_scheme(
    paper: &TextDocument,
    total_questions: u32,
    policy: &FallbackPolicy,
) -> MarkTable {
    let mut table = MarkTable::new();
    let mut out_of_range = 0usize;

    for page in &paper.pages {
        for decl in find_mark_declarations(page) {
            debug!(start = decl.start, end = decl.end, marks = decl.marks, "mark band declared");

            if decl.start > decl.end {
                continue;
            }
            let lo = decl.start.max(1);
            let hi = decl.end.min(total_questions);
            let declared_span = (decl.end - decl.start) as usize + 1;
            let kept = if lo <= hi { (hi - lo) as usize + 1 } else { 0 };
            out_of_range += declared_span - kept;

            for q_no in lo..=hi {
                table.insert(q_no, decl.marks);
            }
        }
    }

    if out_of_range > 0 {
        debug!(out_of_range, "declared question numbers beyond the answer key dropped");
    }

    let declared = table.len();
    for q_no in 1..=total_questions {
        if !table.contains(q_no) {
            table.insert(q_no, policy.marks_for(q_no));
        }
    }

    debug!(
        declared,
        fallback = table.len() - declared,
        "mark scheme resolved"
    );

    table
}

fn mark_word_value(word: &str) -> Option<f64> {
    match word.to_ascii_uppercase().as_str() {
        "ONE" => Some(1.0),
        "TWO" => Some(2.0),
        _ => None,
    }
}
