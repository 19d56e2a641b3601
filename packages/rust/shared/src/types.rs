//! Core domain types for gatecalc: key entries, mark tables, response
//! records, evaluation rows, and the document models the extractors consume.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// QuestionType
// ---------------------------------------------------------------------------

/// Exam question type.
///
/// Unrecognized type strings are preserved in [`QuestionType::Other`] so a
/// malformed key row still produces an evaluation row (scored zero).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    /// Single-correct multiple choice, negatively marked.
    Mcq,
    /// Multi-select, all-or-nothing.
    Msq,
    /// Numeric answer within a published range.
    Nat,
    /// Anything else found in the key's type column.
    Other(String),
}

impl QuestionType {
    /// Parse a type label case-insensitively. Never fails.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "MCQ" => Self::Mcq,
            "MSQ" => Self::Msq,
            "NAT" => Self::Nat,
            other => Self::Other(other.to_string()),
        }
    }

    /// The canonical upper-case label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mcq => "MCQ",
            Self::Msq => "MSQ",
            Self::Nat => "NAT",
            Self::Other(s) => s,
        }
    }

    /// Whether answers of this type are given by choosing displayed options.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Mcq | Self::Msq)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for QuestionType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<QuestionType> for String {
    fn from(value: QuestionType) -> Self {
        value.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// ResponseStatus
// ---------------------------------------------------------------------------

/// Attempt status printed next to each question on the response sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseStatus {
    #[serde(rename = "Not Answered")]
    NotAnswered,
    #[serde(rename = "Answered")]
    Answered,
    #[serde(rename = "Marked For Review")]
    MarkedForReview,
    #[serde(rename = "Not Attempted and Marked For Review")]
    NotAnsweredMarkedForReview,
}

impl ResponseStatus {
    /// All statuses, longest phrase first (the order an alternation must try them).
    pub const ALL: [ResponseStatus; 4] = [
        Self::NotAnsweredMarkedForReview,
        Self::MarkedForReview,
        Self::NotAnswered,
        Self::Answered,
    ];

    /// The phrase as it appears on the response sheet.
    pub fn phrase(self) -> &'static str {
        match self {
            Self::NotAnswered => "Not Answered",
            Self::Answered => "Answered",
            Self::MarkedForReview => "Marked For Review",
            Self::NotAnsweredMarkedForReview => "Not Attempted and Marked For Review",
        }
    }

    /// Match a status phrase case-insensitively, tolerating irregular spacing.
    pub fn from_phrase(text: &str) -> Option<Self> {
        let wanted = crate::text::normalize_space(text).to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.phrase().to_ascii_lowercase() == wanted)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

// ---------------------------------------------------------------------------
// AnswerKeyEntry
// ---------------------------------------------------------------------------

/// One row of the official answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    /// Question number as printed in the paper (1-based).
    pub q_no: u32,
    /// Question type from the key's type column.
    pub q_type: QuestionType,
    /// Paper section (e.g. `GA`, `CS`).
    pub section: String,
    /// Raw key text: a letter for MCQ, `A;C` for MSQ, `lo to hi` for NAT.
    pub key_raw: String,
}

// ---------------------------------------------------------------------------
// MarkTable
// ---------------------------------------------------------------------------

/// Per-question mark used when a question number has no mark-table entry.
pub const DEFAULT_MAX_MARKS: f64 = 1.0;

/// Mapping from question number to its per-question mark value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkTable(BTreeMap<u32, f64>);

impl MarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mark for `q_no`, replacing any earlier value.
    pub fn insert(&mut self, q_no: u32, marks: f64) {
        self.0.insert(q_no, marks);
    }

    pub fn get(&self, q_no: u32) -> Option<f64> {
        self.0.get(&q_no).copied()
    }

    pub fn contains(&self, q_no: u32) -> bool {
        self.0.contains_key(&q_no)
    }

    /// Mark for `q_no`, or [`DEFAULT_MAX_MARKS`] when it is not in the table.
    pub fn max_marks_for(&self, q_no: u32) -> f64 {
        self.get(q_no).unwrap_or(DEFAULT_MAX_MARKS)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending question-number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(q, m)| (*q, *m))
    }
}

impl FromIterator<(u32, f64)> for MarkTable {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// ResponseRecord
// ---------------------------------------------------------------------------

/// One question block recovered from the candidate's response sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Exam-software question identifier (not the paper's question number).
    pub question_id: u64,
    pub q_type: QuestionType,
    pub status: ResponseStatus,
    /// Displayed option labels the candidate chose, in sheet order (upper-case `A`..`D`).
    pub chosen_labels: Vec<char>,
    /// Numeric answer for NAT questions.
    pub given_answer: Option<f64>,
    /// Displayed label → image reference of the option shown under that label.
    pub option_map: BTreeMap<char, String>,
}

// ---------------------------------------------------------------------------
// EvaluationRow
// ---------------------------------------------------------------------------

/// Scored result for one answer-key entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub q_no: u32,
    pub question_id: u64,
    pub q_type: QuestionType,
    pub status: ResponseStatus,
    /// Canonical answer the candidate gave, or `--`.
    pub student_answer: String,
    pub correct_answer: String,
    pub marks: f64,
    pub max_marks: f64,
}

// ---------------------------------------------------------------------------
// Document models
// ---------------------------------------------------------------------------

/// A table as rows of cells; a cell is `None` when the extractor found no text box.
pub type RawTable = Vec<Vec<Option<String>>>;

/// Tables found on one page of a tabular document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePage {
    pub tables: Vec<RawTable>,
}

/// A paginated document reduced to its tables (the answer key).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularDocument {
    pub pages: Vec<TablePage>,
}

impl TabularDocument {
    /// Single-page document holding the given tables.
    pub fn single_page(tables: Vec<RawTable>) -> Self {
        Self {
            pages: vec![TablePage { tables }],
        }
    }

    /// Total number of tables across all pages.
    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }
}

/// A paginated document reduced to plain text per page (the question paper).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDocument {
    pub pages: Vec<String>,
}

impl TextDocument {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }
}
