//! Core pipeline orchestration for gatecalc.
//!
//! This crate ties together document loading, answer-key and mark-scheme
//! extraction, response segmentation, and scoring into the end-to-end
//! `score` workflow.

pub mod pipeline;
pub mod report;

pub use pipeline::{ProgressReporter, RunConfig, SilentProgress, evaluate_documents, run};
pub use report::{EvaluationReport, SourceDigests};
