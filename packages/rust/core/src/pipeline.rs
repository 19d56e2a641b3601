//! End-to-end `score` pipeline: key + paper + response sheet → report.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use gatecalc_documents::{
    ResponseSource, load_answer_key, load_question_paper, load_response_sheet,
};
use gatecalc_key::{extract_answer_key, resolve_mark_scheme};
use gatecalc_response::segment_response_document;
use gatecalc_scoring::{Evaluation, evaluate};
use gatecalc_shared::{
    FallbackPolicy, FetchOptions, GateCalcError, Result, TabularDocument, TextDocument,
};

use crate::report::{EvaluationReport, SourceDigests};

/// Configuration for one `score` run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Answer key file (`.pdf` or `.html`).
    pub answer_key: PathBuf,
    /// Question paper file (`.pdf` or plain text).
    pub question_paper: PathBuf,
    /// Candidate response sheet.
    pub response_sheet: ResponseSource,
    /// Marks for question numbers the paper does not declare.
    pub policy: FallbackPolicy,
    /// HTTP settings for URL response sheets.
    pub fetch: FetchOptions,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &EvaluationReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &EvaluationReport) {}
}

/// Score already-loaded documents.
///
/// 1. Extract the answer key
/// 2. Resolve the mark scheme for as many questions as the key has
/// 3. Segment the response sheet
/// 4. Pair and score
#[instrument(skip_all)]
pub fn evaluate_documents(
    answer_key: &TabularDocument,
    question_paper: &TextDocument,
    response_html: &str,
    policy: &FallbackPolicy,
) -> Result<Evaluation> {
    let entries = extract_answer_key(answer_key)?;
    let total_questions = u32::try_from(entries.len())
        .map_err(|_| GateCalcError::validation("answer key has too many entries"))?;
    info!(entries = entries.len(), "answer key extracted");

    let marks = resolve_mark_scheme(question_paper, total_questions, policy);

    let responses = segment_response_document(response_html);
    if responses.is_empty() {
        return Err(GateCalcError::unparseable_response(
            "no question blocks found in response sheet",
        ));
    }
    info!(responses = responses.len(), "response sheet segmented");

    evaluate(&entries, &marks, &responses)
}

/// Run the full `score` pipeline.
#[instrument(skip_all, fields(response_sheet = %config.response_sheet))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<EvaluationReport> {
    let start = Instant::now();

    progress.phase("Loading answer key");
    let key = load_answer_key(&config.answer_key).await?;

    progress.phase("Loading question paper");
    let paper = load_question_paper(&config.question_paper).await?;

    progress.phase("Retrieving response sheet");
    let sheet = load_response_sheet(&config.response_sheet, &config.fetch).await?;

    progress.phase("Scoring");
    let evaluation = evaluate_documents(&key.document, &paper.document, &sheet.document, &config.policy)?;

    let sources = SourceDigests {
        answer_key: key.sha256,
        question_paper: paper.sha256,
        response_sheet: sheet.sha256,
    };
    let report = EvaluationReport::new(evaluation, sources);

    info!(
        total = report.summary.total,
        max_total = report.summary.max_total,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "score pipeline complete"
    );
    progress.done(&report);

    Ok(report)
}
