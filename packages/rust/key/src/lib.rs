//! Answer-key and mark-scheme extraction.
//!
//! This crate turns the two official exam documents into typed data:
//! - [`extract_answer_key`]: key tables → ordered [`AnswerKeyEntry`] records
//! - [`resolve_mark_scheme`]: question-paper prose → a complete [`MarkTable`]
//!
//! [`AnswerKeyEntry`]: gatecalc_shared::AnswerKeyEntry
//! [`MarkTable`]: gatecalc_shared::MarkTable

mod answer_key;
mod mark_scheme;

pub use answer_key::{extract_answer_key, is_key_header};
pub use mark_scheme::{MarkDeclaration, find_mark_declarations, resolve_mark_scheme};
