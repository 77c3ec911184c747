//! The engine's view of a discovered unit, as far as filtering is concerned.

use std::collections::BTreeSet;

/// A discovered unit eligible for execution.
///
/// Pre-filters only look at [`name`](Candidate::name); post-filters also
/// see the resolved tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Fully-qualified name (e.g. `com.example.MathTests`).
    pub name: String,
    /// Tags resolved from the candidate's metadata.
    pub tags: BTreeSet<String>,
}

impl Candidate {
    /// Create an untagged candidate.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Attach tags. Surrounding whitespace is trimmed.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags
            .extend(tags.into_iter().map(|t| t.as_ref().trim().to_string()));
        self
    }

    /// Whether the candidate carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
