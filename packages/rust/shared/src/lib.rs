//! Shared types, error model, and configuration for gatecalc.
//!
//! This crate is the foundation depended on by all other gatecalc crates.
//! It provides:
//! - [`GateCalcError`]: the unified error type
//! - Domain types ([`AnswerKeyEntry`], [`MarkTable`], [`ResponseRecord`], [`EvaluationRow`])
//! - Input document models ([`TabularDocument`], [`TextDocument`])
//! - Configuration ([`AppConfig`], [`FallbackPolicy`], [`FetchOptions`], config loading)

pub mod config;
pub mod error;
pub mod text;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FallbackPolicy, FetchConfig, FetchOptions, MarkBand,
    MarkSchemeConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{GateCalcError, Result};
pub use text::normalize_space;
pub use types::{
    AnswerKeyEntry, EvaluationRow, MarkTable, QuestionType, RawTable, ResponseRecord,
    ResponseStatus, TablePage, TabularDocument, TextDocument,
};
