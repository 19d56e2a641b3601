//! Text normalization helpers shared by the extractors.

/// Collapse every run of whitespace to a single space and trim both ends.
///
/// Unicode whitespace (including non-breaking spaces common in exported
/// PDFs and HTML) counts as whitespace.
pub fn normalize_space(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(normalize_space("  Q.  No.\n\t"), "Q. No.");
    }

    #[test]
    fn handles_nbsp_and_empty() {
        assert_eq!(normalize_space("Q.\u{a0}Type"), "Q. Type");
        assert_eq!(normalize_space(""), "");
        assert_eq!(normalize_space(" \n "), "");
    }
}
