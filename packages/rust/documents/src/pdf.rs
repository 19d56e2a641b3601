//! PDF text extraction and answer-key table recovery.
//!
//! Text is read from each page's content stream (`Tj`, `TJ`, `'`, `"`), with
//! a line break at text-positioning operators. Table structure is not
//! present in a PDF's text layer, so key rows are recovered from the token
//! stream instead: after a `Q. No. Q. Type` header, every
//! `<digits> <MCQ|MSQ|NAT> <section> <key>` run is one row. Once a header has
//! been seen, later pages are scanned without one (continuation pages).
//!
//! Strings are decoded as UTF-16BE (with BOM) or Latin-1. Font encodings and
//! `ToUnicode` maps are not applied, so pages set in CID fonts (`Identity-H`)
//! come out as glyph ids. Such pages are logged at `warn` and yield no key
//! rows.

use std::sync::LazyLock;

use lopdf::{Document, Object, ObjectId, content::Content};
use regex::Regex;
use tracing::{debug, warn};

use gatecalc_shared::{GateCalcError, RawTable, Result, TablePage, TabularDocument, normalize_space};

/// Header cells of a synthesized key table.
const KEY_HEADER: [&str; 4] = ["Q. No.", "Q. Type", "Section", "Key/Range"];

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Q\.\s*No\.?\s*Q\.\s*Type").expect("key header regex"));

// Key alternatives: NAT range, letter list (`A`, `A;C`), any single token (`MTA`).
static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d+)\s+(MCQ|MSQ|NAT)\s+(\S+)\s+([-+]?\d+(?:\.\d+)?\s*to\s*[-+]?\d+(?:\.\d+)?|[A-D](?:\s*;\s*[A-D])*\b|\S+)",
    )
    .expect("key row regex")
});

/// Extract the text of every page, in page order.
///
/// A page whose content stream cannot be decoded yields an empty string.
pub fn page_texts(bytes: &[u8]) -> Result<Vec<String>> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| GateCalcError::parse(format!("failed to load PDF: {e}")))?;

    if doc.is_encrypted() {
        return Err(GateCalcError::parse("PDF is encrypted and cannot be read"));
    }

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for (page_num, page_id) in pages {
        match extract_text_from_page(&doc, page_id) {
            Ok(text) => {
                if !is_recognizable(&text) {
                    warn!(
                        page = page_num,
                        "page has no recognizable text; it may use a CID font or be scanned"
                    );
                }
                texts.push(text);
            }
            Err(e) => {
                warn!(page = page_num, error = %e, "failed to read page text");
                texts.push(String::new());
            }
        }
    }

    debug!(pages = texts.len(), "PDF text extracted");
    Ok(texts)
}

/// Recover answer-key tables from page texts.
///
/// Each page holding key rows becomes one page with one table whose row 0 is
/// the standard key header.
pub fn key_tables(pages: &[String]) -> TabularDocument {
    let mut header_seen = false;
    let mut doc = TabularDocument::default();

    for page in pages {
        let text = normalize_space(page);
        let body = match HEADER_RE.find(&text) {
            Some(m) => {
                header_seen = true;
                &text[m.end()..]
            }
            None if header_seen => text.as_str(),
            None => {
                doc.pages.push(TablePage::default());
                continue;
            }
        };

        let mut table: RawTable = vec![KEY_HEADER.iter().map(|c| Some(c.to_string())).collect()];
        for caps in ROW_RE.captures_iter(body) {
            table.push((1..=4).map(|i| Some(normalize_space(&caps[i]))).collect());
        }

        let tables = if table.len() > 1 { vec![table] } else { Vec::new() };
        doc.pages.push(TablePage { tables });
    }

    debug!(tables = doc.table_count(), "key tables recovered from PDF text");
    doc
}

/// Whether decoded page text reads as text rather than glyph ids.
///
/// Needs at least one ASCII alphanumeric, and printable characters must make
/// up at least half of the non-whitespace characters.
fn is_recognizable(text: &str) -> bool {
    let mut total = 0usize;
    let mut printable = 0usize;
    let mut alnum = false;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if c.is_ascii_graphic() {
            printable += 1;
            alnum |= c.is_ascii_alphanumeric();
        }
    }
    alnum && printable * 2 >= total
}

fn extract_text_from_page(doc: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let mut text = String::new();
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tj" | "TJ" | "'" | "\"" => {
                for operand in &operation.operands {
                    if let Some(s) = string_from_object(operand) {
                        text.push_str(&s);
                        text.push(' ');
                    }
                }
            }
            "Td" | "TD" | "T*" => {
                if !text.ends_with('\n') && !text.ends_with(' ') {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }

    Ok(text)
}

/// Decode a text operand: UTF-16BE with BOM, otherwise Latin-1.
fn string_from_object(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => {
            if let [0xFE, 0xFF, rest @ ..] = bytes.as_slice() {
                let units: Vec<u16> = rest
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).ok()
            } else {
                Some(bytes.iter().map(|&b| b as char).collect())
            }
        }
        // TJ arrays interleave strings with kerning numbers.
        Object::Array(items) => {
            let joined: String = items.iter().filter_map(string_from_object).collect();
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}
