//! Pairing and per-type scoring.
//!
//! Key entries (ordered by question number) are paired by index with
//! response records ordered by question ID. The two orders coincide on real
//! exams; where they do not, the divergence is reported in
//! [`PairingDiagnostics`] and the pairing is left as is.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use gatecalc_response::resolve_canonical;
use gatecalc_shared::{
    AnswerKeyEntry, EvaluationRow, GateCalcError, MarkTable, QuestionType, ResponseRecord, Result,
};

/// Slack applied to both ends of a NAT answer range.
pub const NAT_TOLERANCE: f64 = 1e-9;

/// Fraction of the question's mark deducted for a wrong MCQ answer.
pub const MCQ_PENALTY_FRACTION: f64 = 1.0 / 3.0;

/// Student answer shown when nothing scorable was given.
pub const NO_ANSWER: &str = "--";

static NAT_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([-+]?\d+(?:\.\d+)?)\s*to\s*([-+]?\d+(?:\.\d+)?)").expect("NAT range regex")
});

// ---------------------------------------------------------------------------
// Pairing diagnostics
// ---------------------------------------------------------------------------

/// A key entry paired with a response of a different question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMismatch {
    /// Position in the key / sorted-response order.
    pub index: usize,
    pub q_no: u32,
    pub question_id: u64,
    pub key_type: QuestionType,
    pub response_type: QuestionType,
}

/// How far the positional pairing deviates from a one-to-one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingDiagnostics {
    pub key_entries: usize,
    pub responses: usize,
    /// Responses left unpaired after the last key entry.
    pub extra_responses: usize,
    pub type_mismatches: Vec<TypeMismatch>,
}

impl PairingDiagnostics {
    /// `true` when every response was paired with a key entry of the same type.
    pub fn is_aligned(&self) -> bool {
        self.extra_responses == 0 && self.type_mismatches.is_empty()
    }
}

/// Rows plus pairing diagnostics for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// One row per key entry, in key order.
    pub rows: Vec<EvaluationRow>,
    pub pairing: PairingDiagnostics,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Score every key entry against its positionally paired response.
///
/// Fails with [`GateCalcError::InsufficientResponses`] when there are fewer
/// responses than key entries. `marks` supplies each question's maximum; a
/// missing entry counts as 1.0.
#[instrument(skip_all, fields(keys = keys.len(), responses = responses.len()))]
pub fn evaluate(
    keys: &[AnswerKeyEntry],
    marks: &MarkTable,
    responses: &[ResponseRecord],
) -> Result<Evaluation> {
    if responses.len() < keys.len() {
        return Err(GateCalcError::InsufficientResponses {
            responses: responses.len(),
            expected: keys.len(),
        });
    }

    let mut sorted: Vec<&ResponseRecord> = responses.iter().collect();
    sorted.sort_by_key(|r| r.question_id);

    let mut pairing = PairingDiagnostics {
        key_entries: keys.len(),
        responses: responses.len(),
        extra_responses: responses.len() - keys.len(),
        type_mismatches: Vec::new(),
    };

    let mut rows = Vec::with_capacity(keys.len());
    for (index, (key, response)) in keys.iter().zip(sorted).enumerate() {
        if key.q_type != response.q_type {
            debug!(
                index,
                q_no = key.q_no,
                question_id = response.question_id,
                key_type = %key.q_type,
                response_type = %response.q_type,
                "key and response types differ"
            );
            pairing.type_mismatches.push(TypeMismatch {
                index,
                q_no: key.q_no,
                question_id: response.question_id,
                key_type: key.q_type.clone(),
                response_type: response.q_type.clone(),
            });
        }

        let max_marks = marks.max_marks_for(key.q_no);
        let (student_answer, earned) = score_question(key, response, max_marks);

        rows.push(EvaluationRow {
            q_no: key.q_no,
            question_id: response.question_id,
            q_type: key.q_type.clone(),
            status: response.status,
            student_answer,
            correct_answer: key.key_raw.clone(),
            marks: earned,
            max_marks,
        });
    }

    if !pairing.is_aligned() {
        warn!(
            extra_responses = pairing.extra_responses,
            type_mismatches = pairing.type_mismatches.len(),
            "positional pairing of key and responses diverges"
        );
    }
    debug!(rows = rows.len(), "evaluation complete");

    Ok(Evaluation { rows, pairing })
}

/// Student answer and marks earned for one pair.
fn score_question(key: &AnswerKeyEntry, response: &ResponseRecord, max_marks: f64) -> (String, f64) {
    match key.q_type {
        QuestionType::Mcq => score_mcq(key, response, max_marks),
        QuestionType::Msq => score_msq(key, response, max_marks),
        QuestionType::Nat => score_nat(key, response, max_marks),
        QuestionType::Other(_) => (NO_ANSWER.into(), 0.0),
    }
}

fn score_mcq(key: &AnswerKeyEntry, response: &ResponseRecord, max_marks: f64) -> (String, f64) {
    let Some(chosen) = response
        .chosen_labels
        .first()
        .and_then(|label| resolve_canonical(&response.option_map, *label))
    else {
        return (NO_ANSWER.into(), 0.0);
    };

    let student = chosen.to_string();
    let earned = if key.key_raw.trim().eq_ignore_ascii_case(&student) {
        max_marks
    } else {
        -(max_marks * MCQ_PENALTY_FRACTION)
    };
    (student, earned)
}

fn score_msq(key: &AnswerKeyEntry, response: &ResponseRecord, max_marks: f64) -> (String, f64) {
    let chosen: BTreeSet<String> = response
        .chosen_labels
        .iter()
        .filter_map(|label| resolve_canonical(&response.option_map, *label))
        .map(String::from)
        .collect();

    if chosen.is_empty() {
        return (NO_ANSWER.into(), 0.0);
    }

    let correct: BTreeSet<String> = key
        .key_raw
        .split(';')
        .map(|item| item.trim().to_ascii_uppercase())
        .filter(|item| !item.is_empty())
        .collect();

    let student = chosen.iter().map(String::as_str).collect::<Vec<_>>().join(";");
    let earned = if chosen == correct { max_marks } else { 0.0 };
    (student, earned)
}

fn score_nat(key: &AnswerKeyEntry, response: &ResponseRecord, max_marks: f64) -> (String, f64) {
    let Some(given) = response.given_answer else {
        return (NO_ANSWER.into(), 0.0);
    };

    let earned = match parse_nat_range(&key.key_raw) {
        Some((lo, hi)) if lo - NAT_TOLERANCE <= given && given <= hi + NAT_TOLERANCE => max_marks,
        Some(_) => 0.0,
        None => {
            debug!(q_no = key.q_no, key = %key.key_raw, "NAT key has no 'lo to hi' range");
            0.0
        }
    };
    (display_number(given), earned)
}

/// Parse a `<lo> to <hi>` NAT key.
pub fn parse_nat_range(key_raw: &str) -> Option<(f64, f64)> {
    let caps = NAT_RANGE_RE.captures(key_raw)?;
    let lo = caps[1].parse::<f64>().ok()?;
    let hi = caps[2].parse::<f64>().ok()?;
    Some((lo, hi))
}

/// Render a numeric answer with at least one fractional digit (`10.0`, `10.5`).
pub fn display_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
