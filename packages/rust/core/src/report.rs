//! The evaluation report: scored rows plus the provenance of its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatecalc_scoring::{Evaluation, PairingDiagnostics, ScoreSummary};
use gatecalc_shared::EvaluationRow;

/// SHA-256 of each input document, lower-case hex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDigests {
    pub answer_key: String,
    pub question_paper: String,
    pub response_sheet: String,
}

/// Everything one evaluation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub rows: Vec<EvaluationRow>,
    pub summary: ScoreSummary,
    pub pairing: PairingDiagnostics,
    pub sources: SourceDigests,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationReport {
    /// Summarize `evaluation` and stamp it with the current time.
    pub fn new(evaluation: Evaluation, sources: SourceDigests) -> Self {
        let summary = ScoreSummary::from_rows(&evaluation.rows);
        Self {
            rows: evaluation.rows,
            summary,
            pairing: evaluation.pairing,
            sources,
            evaluated_at: Utc::now(),
        }
    }
}
