//! Scoring for gatecalc.
//!
//! [`evaluate`] pairs answer-key entries with response records and applies
//! the per-type rules:
//!
//! | Type | Credit | Penalty |
//! |------|--------|---------|
//! | MCQ  | resolved option equals the key | one third of the mark |
//! | MSQ  | resolved set equals the key set exactly | none |
//! | NAT  | answer inside the key's `lo to hi` range | none |
//!
//! [`ScoreSummary`] aggregates the resulting rows.

pub mod engine;
pub mod summary;

pub use engine::{
    Evaluation, MCQ_PENALTY_FRACTION, NAT_TOLERANCE, NO_ANSWER, PairingDiagnostics, TypeMismatch,
    display_number, evaluate, parse_nat_range,
};
pub use summary::{MarkGroup, ScoreSummary};
