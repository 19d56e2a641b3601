//! Response-sheet flattening: marked-up HTML → one whitespace-normalized line.
//!
//! Option images carry the canonical answer letter in their filename, so each
//! `<img>` is replaced by an `IMG_SRC:<src>` sentinel token before the markup
//! is dropped.

use scraper::{Html, Node};

use gatecalc_shared::normalize_space;

/// Prefix of the text token standing in for an `<img>` element.
pub const IMAGE_SENTINEL: &str = "IMG_SRC:";

/// Elements whose text never reaches the flattened output.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Flatten an HTML document to normalized text with image sentinels.
///
/// Text nodes are joined with single spaces, so adjacent table cells never
/// run together.
pub fn flatten_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut pieces: Vec<String> = Vec::new();

    for node in doc.tree.root().descendants() {
        match node.value() {
            Node::Text(text) => {
                let skipped = node.ancestors().any(|ancestor| {
                    matches!(ancestor.value(), Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()))
                });
                if !skipped {
                    let text: &str = text;
                    pieces.push(text.to_owned());
                }
            }
            Node::Element(el) if el.name() == "img" => {
                let src = el.attr("src").unwrap_or_default();
                pieces.push(format!(" {IMAGE_SENTINEL}{src} "));
            }
            _ => {}
        }
    }

    normalize_space(&pieces.join(" "))
}
