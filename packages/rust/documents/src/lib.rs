//! Input loading for gatecalc.
//!
//! Turns files and URLs into the document models the extractors consume:
//! - answer key (`.pdf`, `.html`/`.htm`) → [`TabularDocument`]
//! - question paper (`.pdf`, anything else as plain text) → [`TextDocument`]
//! - response sheet (`http(s)://` URL or file path) → HTML text
//!
//! Every loader also reports the SHA-256 of the raw input.

pub mod fetch;
pub mod html;
pub mod pdf;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use url::Url;

use gatecalc_shared::{FetchOptions, GateCalcError, Result, TabularDocument, TextDocument};

pub use fetch::{build_client, fetch_text};
pub use html::html_tables;
pub use pdf::{key_tables, page_texts};

/// A loaded document with the digest of the bytes it came from.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub document: T,
    /// Lower-case hex SHA-256 of the raw input.
    pub sha256: String,
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Answer key / question paper
// ---------------------------------------------------------------------------

/// Load an answer key from a PDF or HTML file.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_answer_key(path: &Path) -> Result<Loaded<TabularDocument>> {
    let bytes = read_file(path).await?;
    let document = match extension(path).as_deref() {
        Some("pdf") => key_tables(&page_texts(&bytes)?),
        Some("html" | "htm") => html_tables(&String::from_utf8_lossy(&bytes)),
        _ => {
            return Err(GateCalcError::validation(format!(
                "unsupported answer key format: {} (expected .pdf or .html)",
                path.display()
            )));
        }
    };

    info!(tables = document.table_count(), "answer key loaded");
    Ok(Loaded {
        document,
        sha256: sha256_hex(&bytes),
    })
}

/// Load a question paper: PDFs page by page, anything else as one text page.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_question_paper(path: &Path) -> Result<Loaded<TextDocument>> {
    let bytes = read_file(path).await?;
    let pages = match extension(path).as_deref() {
        Some("pdf") => page_texts(&bytes)?,
        _ => vec![String::from_utf8_lossy(&bytes).into_owned()],
    };

    info!(pages = pages.len(), "question paper loaded");
    Ok(Loaded {
        document: TextDocument::new(pages),
        sha256: sha256_hex(&bytes),
    })
}

// ---------------------------------------------------------------------------
// Response sheet
// ---------------------------------------------------------------------------

/// Where the candidate's response sheet comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSource {
    Url(Url),
    File(PathBuf),
}

impl FromStr for ResponseSource {
    type Err = GateCalcError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(s)
                .map_err(|e| GateCalcError::validation(format!("invalid URL '{s}': {e}")))?;
            Ok(Self::Url(url))
        } else {
            Ok(Self::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Retrieve the response sheet HTML.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_response_sheet(
    source: &ResponseSource,
    opts: &FetchOptions,
) -> Result<Loaded<String>> {
    let html = match source {
        ResponseSource::Url(url) => fetch_text(url, opts).await?,
        ResponseSource::File(path) => String::from_utf8_lossy(&read_file(path).await?).into_owned(),
    };

    info!(bytes = html.len(), "response sheet loaded");
    let sha256 = sha256_hex(html.as_bytes());
    Ok(Loaded {
        document: html,
        sha256,
    })
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| GateCalcError::io(path, e))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join("gatecalc-documents-test");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        std::fs::write(&path, bytes).expect("write temp file");
        path
    }

    #[test]
    fn digest_is_lowercase_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn response_source_parses_urls_and_paths() {
        let src: ResponseSource = "https://cdn.example.org/sheet.html".parse().expect("parse");
        assert!(matches!(src, ResponseSource::Url(_)));

        let src: ResponseSource = "HTTP://cdn.example.org/x".parse().expect("parse");
        assert!(matches!(src, ResponseSource::Url(_)));

        let src: ResponseSource = "./sheet.html".parse().expect("parse");
        assert_eq!(src, ResponseSource::File(PathBuf::from("./sheet.html")));

        assert!("https://".parse::<ResponseSource>().is_err());
    }

    #[tokio::test]
    async fn loads_html_answer_key_fixture() {
        let loaded = load_answer_key(&fixture("answer_key.html")).await.expect("load");
        assert_eq!(loaded.document.table_count(), 1);
        assert_eq!(loaded.sha256.len(), 64);
    }

    #[tokio::test]
    async fn loads_pdf_answer_key() {
        let bytes = pdf::tests::build_pdf(&[&[
            "Q. No.",
            "Q. Type",
            "Section",
            "Key/Range",
            "1 MCQ GA B",
            "2 NAT CS 3 to 4",
        ]]);
        let path = temp_file("key.pdf", &bytes);

        let loaded = load_answer_key(&path).await.expect("load");
        let table = &loaded.document.pages[0].tables[0];
        assert_eq!(table.len(), 3);
        assert_eq!(table[2][3].as_deref(), Some("3 to 4"));
    }

    #[tokio::test]
    async fn rejects_unknown_key_format() {
        let path = temp_file("key.csv", b"1,MCQ,GA,B");
        let err = load_answer_key(&path).await.unwrap_err();
        assert!(err.to_string().contains("unsupported answer key format"));
    }

    #[tokio::test]
    async fn plain_text_paper_is_one_page() {
        let path = temp_file("paper.txt", "Q.1 – Q.5 Carry ONE mark Each".as_bytes());
        let loaded = load_question_paper(&path).await.expect("load");
        assert_eq!(loaded.document.pages.len(), 1);
        assert!(loaded.document.pages[0].contains("Carry ONE"));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_question_paper(Path::new("/nonexistent/paper.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, GateCalcError::Io { .. }));
    }

    #[tokio::test]
    async fn response_sheet_from_file() {
        let source = ResponseSource::File(fixture("response_sheet.html"));
        let loaded = load_response_sheet(&source, &FetchOptions::default())
            .await
            .expect("load");
        assert!(loaded.document.contains("Question Type"));
    }
}
