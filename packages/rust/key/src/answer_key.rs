//! Answer-key table extraction.
//!
//! The key document is a set of tables whose first row is a header of the form
//! `Q. No. | Q. Type | Section | Key`. Decorative tables and stray footer rows
//! are filtered out by the header markers and the numeric question-number
//! column.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use gatecalc_shared::{
    AnswerKeyEntry, GateCalcError, QuestionType, Result, TabularDocument, normalize_space,
};

/// Minimum number of columns a key table (and each of its rows) must have.
const MIN_COLUMNS: usize = 4;

/// Header marker expected in the first column.
const Q_NO_MARKER: &str = "Q. No.";

/// Header marker expected in the second column.
const Q_TYPE_MARKER: &str = "Q. Type";

/// Extract every answer-key row from `doc`, sorted by question number.
///
/// Fails with [`GateCalcError::EmptyKey`] when no row survives filtering.
#[instrument(skip_all, fields(pages = doc.pages.len(), tables = doc.table_count()))]
pub fn extract_answer_key(doc: &TabularDocument) -> Result<Vec<AnswerKeyEntry>> {
    let mut entries: Vec<AnswerKeyEntry> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();

    for (page_idx, page) in doc.pages.iter().enumerate() {
        for table in &page.tables {
            let Some(header) = table.first() else {
                continue;
            };
            if !is_key_header(header) {
                debug!(page = page_idx + 1, "skipping table without key header");
                continue;
            }

            for row in &table[1..] {
                let Some(entry) = parse_row(row) else {
                    continue;
                };
                if !seen.insert(entry.q_no) {
                    warn!(q_no = entry.q_no, "duplicate answer-key row ignored");
                    continue;
                }
                entries.push(entry);
            }
        }
    }

    if entries.is_empty() {
        return Err(GateCalcError::EmptyKey);
    }

    entries.sort_by_key(|e| e.q_no);
    debug!(entries = entries.len(), "answer key extracted");

    Ok(entries)
}

/// Whether a table's first row identifies it as an answer-key table.
pub fn is_key_header(header: &[Option<String>]) -> bool {
    if header.len() < MIN_COLUMNS {
        return false;
    }
    let first = normalize_cell(&header[0]);
    let second = normalize_cell(&header[1]);
    first.contains(Q_NO_MARKER) && second.contains(Q_TYPE_MARKER)
}

/// Turn one data row into an entry, or `None` for footer/blank/short rows.
fn parse_row(row: &[Option<String>]) -> Option<AnswerKeyEntry> {
    if row.len() < MIN_COLUMNS {
        return None;
    }

    let q_no_txt = normalize_cell(&row[0]);
    if q_no_txt.is_empty() || !q_no_txt.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let Ok(q_no) = q_no_txt.parse::<u32>() else {
        warn!(q_no = %q_no_txt, "question number out of range");
        return None;
    };

    Some(AnswerKeyEntry {
        q_no,
        q_type: QuestionType::parse(&normalize_cell(&row[1])),
        section: normalize_cell(&row[2]),
        key_raw: normalize_cell(&row[3]),
    })
}

fn normalize_cell(cell: &Option<String>) -> String {
    cell.as_deref().map(normalize_space).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecalc_shared::{RawTable, TablePage};

    fn table(rows: &[&[&str]]) -> RawTable {
        rows.iter()
            .map(|row| row.iter().map(|c| Some((*c).to_string())).collect())
            .collect()
    }

    fn key_table(rows: &[&[&str]]) -> RawTable {
        let mut all: Vec<&[&str]> = Vec::new();
        all.push(&["Q. No.", "Q. Type", "Section", "Key/Range"]);
        all.extend_from_slice(rows);
        table(&all)
    }

    #[test]
    fn extracts_and_sorts_rows() {
        let doc = TabularDocument {
            pages: vec![
                TablePage {
                    tables: vec![key_table(&[&["3", "nat", "GA", "10 to 10.5"]])],
                },
                TablePage {
                    tables: vec![key_table(&[
                        &["1", "MCQ", "GA", "B"],
                        &["2", "msq", "CS", "A;C"],
                    ])],
                },
            ],
        };

        let entries = extract_answer_key(&doc).unwrap();
        let numbers: Vec<u32> = entries.iter().map(|e| e.q_no).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(entries[1].q_type, QuestionType::Msq);
        assert_eq!(entries[2].q_type, QuestionType::Nat);
        assert_eq!(entries[2].key_raw, "10 to 10.5");
    }

    #[test]
    fn normalizes_whitespace_in_cells() {
        let doc = TabularDocument::single_page(vec![table(&[
            &["Q.\nNo.", " Q.  Type ", "Section", "Key"],
            &[" 12 ", "MCQ", "  C S ", "  D\n"],
        ])]);

        let entries = extract_answer_key(&doc).unwrap();
        assert_eq!(entries[0].q_no, 12);
        assert_eq!(entries[0].section, "C S");
        assert_eq!(entries[0].key_raw, "D");
    }

    #[test]
    fn skips_tables_without_markers() {
        let decorative = table(&[
            &["Paper", "Code", "Date", "Session"],
            &["1", "CS", "2025-02-01", "FN"],
        ]);
        let doc = TabularDocument::single_page(vec![
            decorative,
            key_table(&[&["1", "MCQ", "GA", "A"]]),
        ]);

        let entries = extract_answer_key(&doc).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key_raw, "A");
    }

    #[test]
    fn skips_narrow_tables_and_rows() {
        let narrow = table(&[&["Q. No.", "Q. Type", "Key"], &["1", "MCQ", "A"]]);
        let doc = TabularDocument::single_page(vec![
            narrow,
            key_table(&[&["2", "MCQ", "GA"], &["3", "MCQ", "GA", "C"]]),
        ]);

        let entries = extract_answer_key(&doc).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].q_no, 3);
    }

    #[test]
    fn skips_non_numeric_rows() {
        let doc = TabularDocument::single_page(vec![key_table(&[
            &["1", "MCQ", "GA", "A"],
            &["", "", "", ""],
            &["Page 1 of 3", "", "", ""],
            &["2a", "MCQ", "GA", "B"],
        ])]);

        let entries = extract_answer_key(&doc).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn absent_cells_are_treated_as_empty() {
        let doc = TabularDocument::single_page(vec![vec![
            vec![
                Some("Q. No.".into()),
                Some("Q. Type".into()),
                Some("Section".into()),
                Some("Key".into()),
            ],
            vec![Some("4".into()), Some("MCQ".into()), None, None],
        ]]);

        let entries = extract_answer_key(&doc).unwrap();
        assert_eq!(entries[0].section, "");
        assert_eq!(entries[0].key_raw, "");
    }

    #[test]
    fn duplicate_numbers_keep_first_row() {
        let doc = TabularDocument::single_page(vec![key_table(&[
            &["5", "MCQ", "GA", "A"],
            &["5", "MCQ", "GA", "D"],
        ])]);

        let entries = extract_answer_key(&doc).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key_raw, "A");
    }

    #[test]
    fn output_numbers_are_unique_and_ascending() {
        let doc = TabularDocument::single_page(vec![key_table(&[
            &["9", "NAT", "CS", "1 to 2"],
            &["4", "MCQ", "CS", "A"],
            &["4", "MCQ", "CS", "B"],
            &["7", "MSQ", "CS", "A;B"],
        ])]);

        let entries = extract_answer_key(&doc).unwrap();
        let numbers: Vec<u32> = entries.iter().map(|e| e.q_no).collect();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_document_fails() {
        let err = extract_answer_key(&TabularDocument::default()).unwrap_err();
        assert!(matches!(err, GateCalcError::EmptyKey));
    }

    #[test]
    fn header_only_table_fails() {
        let doc = TabularDocument::single_page(vec![key_table(&[])]);
        assert!(matches!(
            extract_answer_key(&doc),
            Err(GateCalcError::EmptyKey)
        ));
    }
}
