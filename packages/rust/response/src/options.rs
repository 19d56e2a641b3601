//! Displayed-label → canonical-option resolution.
//!
//! The exam software shuffles option order per candidate, but every option
//! image is named after its canonical letter (`.../q17c.png`). Resolution
//! first maps each displayed label to an image reference, then reads the
//! canonical letter back out of that reference.
//!
//! Label mapping is an ordered chain of [`OptionStrategy`]s; the first one to
//! produce a complete A–D map wins.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::tokenizer::{Field, FieldToken, scan_fields};

/// Displayed option labels, in canonical assignment order.
pub const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Image extensions recognized in option filenames.
const IMAGE_EXTENSIONS: &str = "png|jpe?g|gif|webp|svg";

/// Image reference whose filename ends in an option letter (query string excluded).
static SUFFIXED_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^(\S+[a-d]\.(?:{IMAGE_EXTENSIONS}))")).expect("suffixed image regex")
});

/// Canonical letter immediately before the extension, then end or a query string.
static CANONICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)([a-d])\.(?:{IMAGE_EXTENSIONS})(?:\?|$)")).expect("canonical regex")
});

/// Displayed label → image reference.
pub type OptionMap = BTreeMap<char, String>;

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

/// Outcome of one resolution strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Every label in [`OPTION_LABELS`] was mapped.
    Complete(OptionMap),
    /// Some labels are missing; holds what was found.
    Partial(OptionMap),
}

impl Resolution {
    fn from_map(map: OptionMap) -> Self {
        if OPTION_LABELS.iter().all(|label| map.contains_key(label)) {
            Self::Complete(map)
        } else {
            Self::Partial(map)
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn into_map(self) -> OptionMap {
        match self {
            Self::Complete(map) | Self::Partial(map) => map,
        }
    }
}

/// One way of mapping displayed labels to image references.
pub trait OptionStrategy: Send + Sync {
    /// Try to map labels using the field tokens of a question's content span.
    fn resolve(&self, fields: &[Field]) -> Resolution;

    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;
}

/// Pairs each label with the first image printed right after `<label>.`.
pub struct LabelledImageStrategy;

impl OptionStrategy for LabelledImageStrategy {
    fn resolve(&self, fields: &[Field]) -> Resolution {
        let mut map = OptionMap::new();
        for field in fields {
            if let FieldToken::LabelledImage { label, src } = &field.token {
                if OPTION_LABELS.contains(label) {
                    map.entry(*label).or_insert_with(|| src.clone());
                }
            }
        }
        Resolution::from_map(map)
    }

    fn name(&self) -> &str {
        "labelled-image"
    }
}

/// Assigns the first four distinct letter-suffixed images to A, B, C, D.
pub struct FilenameSuffixStrategy;

impl OptionStrategy for FilenameSuffixStrategy {
    fn resolve(&self, fields: &[Field]) -> Resolution {
        let mut unique: Vec<&str> = Vec::new();
        for field in fields {
            let FieldToken::Image { src } = &field.token else {
                continue;
            };
            let Some(caps) = SUFFIXED_IMAGE_RE.captures(src) else {
                continue;
            };
            let reference = caps.get(1).map_or("", |m| m.as_str());
            if !unique.contains(&reference) {
                unique.push(reference);
            }
        }

        if unique.len() < OPTION_LABELS.len() {
            return Resolution::Partial(OptionMap::new());
        }

        let map = OPTION_LABELS
            .iter()
            .zip(unique)
            .map(|(label, src)| (*label, src.to_string()))
            .collect();
        Resolution::Complete(map)
    }

    fn name(&self) -> &str {
        "filename-suffix"
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Holds label-mapping strategies in priority order.
pub struct OptionResolver {
    strategies: Vec<Box<dyn OptionStrategy>>,
}

impl OptionResolver {
    /// Create a resolver with the built-in strategies (labelled images first).
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(LabelledImageStrategy),
            Box::new(FilenameSuffixStrategy),
        ])
    }

    /// Create a resolver with a custom strategy chain.
    pub fn with_strategies(strategies: Vec<Box<dyn OptionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Map displayed labels to image references from a question's raw content.
    pub fn resolve(&self, content: &str) -> OptionMap {
        self.resolve_fields(&scan_fields(content))
    }

    /// Map labels from already-scanned field tokens.
    ///
    /// Returns the first complete map; if no strategy completes, the partial
    /// map of the highest-priority strategy.
    pub fn resolve_fields(&self, fields: &[Field]) -> OptionMap {
        let mut primary_partial: Option<OptionMap> = None;

        for strategy in &self.strategies {
            match strategy.resolve(fields) {
                Resolution::Complete(map) => {
                    debug!(strategy = strategy.name(), "option map resolved");
                    return map;
                }
                Resolution::Partial(map) => {
                    debug!(strategy = strategy.name(), found = map.len(), "option map incomplete");
                    primary_partial.get_or_insert(map);
                }
            }
        }

        primary_partial.unwrap_or_default()
    }
}

impl Default for OptionResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical option letter behind displayed `label`, read from its image filename.
///
/// `None` when the label is not mapped or its image name carries no letter suffix.
pub fn resolve_canonical(option_map: &OptionMap, label: char) -> Option<char> {
    let reference = option_map.get(&label.to_ascii_uppercase())?;
    let caps = CANONICAL_RE.captures(reference)?;
    caps[1].chars().next().map(|c| c.to_ascii_uppercase())
}
