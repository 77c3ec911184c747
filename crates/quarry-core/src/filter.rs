//! Filters decide *what to keep* once candidates are found.
//!
//! Every [`Filter`] belongs to a fixed [`FilterStage`]. Pre-filters run
//! during traversal and only see a qualified name, so they prune before any
//! metadata is resolved. Post-filters run after tags are known.
//!
//! The variant set is closed: consumers match exhaustively and there is no
//! fallback arm that could silently let an unknown filter pass.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::candidate::Candidate;
use crate::request::RequestError;

/// When a filter is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    /// During discovery, on the qualified name alone.
    Pre,
    /// After candidate metadata has been resolved.
    Post,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::Pre => f.write_str("pre"),
            FilterStage::Post => f.write_str("post"),
        }
    }
}

/// A compiled class-name pattern that must match the *whole* name.
///
/// Equality and serialization use the source text, so two patterns built
/// from the same expression compare equal.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    compiled: Regex,
}

impl NamePattern {
    /// Compile a pattern. The expression is anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, RequestError> {
        let compiled = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            RequestError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            compiled,
        })
    }

    /// The expression as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `name` matches in full.
    pub fn is_match(&self, name: &str) -> bool {
        self.compiled.is_match(name)
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for NamePattern {}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for NamePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Outcome of applying a filter to a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterResult {
    Included { reason: String },
    Excluded { reason: String },
}

impl FilterResult {
    /// Keep the candidate, recording why.
    pub fn included(reason: impl Into<String>) -> Self {
        FilterResult::Included {
            reason: reason.into(),
        }
    }

    /// Drop the candidate, recording why.
    pub fn excluded(reason: impl Into<String>) -> Self {
        FilterResult::Excluded {
            reason: reason.into(),
        }
    }

    pub fn is_included(&self) -> bool {
        matches!(self, FilterResult::Included { .. })
    }

    pub fn is_excluded(&self) -> bool {
        !self.is_included()
    }

    /// The human-readable explanation, whichever way the filter went.
    pub fn reason(&self) -> &str {
        match self {
            FilterResult::Included { reason } | FilterResult::Excluded { reason } => reason,
        }
    }
}

/// A predicate over discovered candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Keep candidates whose qualified name fully matches.
    NamePattern { pattern: NamePattern },
    /// Keep candidates carrying at least one of these tags.
    IncludeTags { tags: BTreeSet<String> },
    /// Drop candidates carrying any of these tags.
    ExcludeTags { tags: BTreeSet<String> },
}

impl Filter {
    /// Pre-filter on the qualified name.
    pub fn by_name_pattern(pattern: &str) -> Result<Self, RequestError> {
        Ok(Filter::NamePattern {
            pattern: NamePattern::new(pattern)?,
        })
    }

    /// Post-filter keeping candidates tagged with any of `tags`.
    pub fn include_tags<I, S>(tags: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Filter::IncludeTags {
            tags: normalize_tags(tags)?,
        })
    }

    /// Post-filter dropping candidates tagged with any of `tags`.
    pub fn exclude_tags<I, S>(tags: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Filter::ExcludeTags {
            tags: normalize_tags(tags)?,
        })
    }

    /// The stage this filter must be evaluated in.
    pub fn stage(&self) -> FilterStage {
        match self {
            Filter::NamePattern { .. } => FilterStage::Pre,
            Filter::IncludeTags { .. } | Filter::ExcludeTags { .. } => FilterStage::Post,
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Filter::NamePattern { .. } => "name_pattern",
            Filter::IncludeTags { .. } => "include_tags",
            Filter::ExcludeTags { .. } => "exclude_tags",
        }
    }

    /// Apply the filter to a candidate.
    pub fn apply(&self, candidate: &Candidate) -> FilterResult {
        match self {
            Filter::NamePattern { pattern } => {
                if pattern.is_match(&candidate.name) {
                    FilterResult::included(format!(
                        "name '{}' matches pattern '{pattern}'",
                        candidate.name
                    ))
                } else {
                    FilterResult::excluded(format!(
                        "name '{}' does not match pattern '{pattern}'",
                        candidate.name
                    ))
                }
            }
            Filter::IncludeTags { tags } => match first_shared_tag(tags, candidate) {
                Some(tag) => FilterResult::included(format!("carries included tag '{tag}'")),
                None => FilterResult::excluded(format!(
                    "carries none of the included tags {}",
                    render_tags(tags)
                )),
            },
            Filter::ExcludeTags { tags } => match first_shared_tag(tags, candidate) {
                Some(tag) => FilterResult::excluded(format!("carries excluded tag '{tag}'")),
                None => FilterResult::included(format!(
                    "carries none of the excluded tags {}",
                    render_tags(tags)
                )),
            },
        }
    }
}

fn normalize_tags<I, S>(tags: I) -> Result<BTreeSet<String>, RequestError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized = BTreeSet::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            return Err(RequestError::BlankTag);
        }
        normalized.insert(tag.to_string());
    }
    if normalized.is_empty() {
        return Err(RequestError::EmptyTagFilter);
    }
    Ok(normalized)
}

fn first_shared_tag<'a>(tags: &'a BTreeSet<String>, candidate: &Candidate) -> Option<&'a str> {
    tags.iter()
        .find(|t| candidate.has_tag(t))
        .map(String::as_str)
}

fn render_tags(tags: &BTreeSet<String>) -> String {
    let joined = tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pattern_must_match_whole_name() {
        let filter = Filter::by_name_pattern(".*Tests").unwrap();
        assert!(filter.apply(&Candidate::new("com.example.MathTests")).is_included());
        assert!(filter
            .apply(&Candidate::new("com.example.MathTestsHelper"))
            .is_excluded());
    }

    #[test]
    fn test_pattern_alternation_is_anchored_as_a_group() {
        let filter = Filter::by_name_pattern("a.B|c.D").unwrap();
        assert!(filter.apply(&Candidate::new("a.B")).is_included());
        assert!(filter.apply(&Candidate::new("c.D")).is_included());
        assert!(filter.apply(&Candidate::new("a.Bx")).is_excluded());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = Filter::by_name_pattern("(unclosed").unwrap_err();
        assert!(matches!(
            err,
            RequestError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"
        ));
    }

    #[test]
    fn test_patterns_compare_by_source() {
        assert_eq!(
            Filter::by_name_pattern(".*IT").unwrap(),
            Filter::by_name_pattern(".*IT").unwrap()
        );
        assert_ne!(
            Filter::by_name_pattern(".*IT").unwrap(),
            Filter::by_name_pattern(".*Tests").unwrap()
        );
    }

    #[test]
    fn test_stages() {
        assert_eq!(Filter::by_name_pattern("x").unwrap().stage(), FilterStage::Pre);
        assert_eq!(Filter::include_tags(["x"]).unwrap().stage(), FilterStage::Post);
        assert_eq!(Filter::exclude_tags(["x"]).unwrap().stage(), FilterStage::Post);
    }

    #[test]
    fn test_include_requires_one_shared_tag() {
        let filter = Filter::include_tags(["fast", "unit"]).unwrap();
        let tagged = Candidate::new("a.B").with_tags(["unit", "db"]);
        let result = filter.apply(&tagged);
        assert_eq!(result, FilterResult::included("carries included tag 'unit'"));
    }

    #[test]
    fn test_include_excludes_untagged_candidate() {
        let filter = Filter::include_tags(["fast"]).unwrap();
        let result = filter.apply(&Candidate::new("a.B"));
        assert_eq!(
            result,
            FilterResult::excluded("carries none of the included tags [fast]")
        );
    }

    #[test]
    fn test_exclude_drops_tagged_candidate() {
        let filter = Filter::exclude_tags(["slow"]).unwrap();
        assert!(filter
            .apply(&Candidate::new("a.B").with_tags(["slow"]))
            .is_excluded());
        assert!(filter
            .apply(&Candidate::new("a.B").with_tags(["fast"]))
            .is_included());
    }

    #[test]
    fn test_tags_trimmed_and_deduplicated() {
        let filter = Filter::include_tags([" x", "x ", "y"]).unwrap();
        let Filter::IncludeTags { tags } = filter else {
            panic!("expected an include filter");
        };
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_blank_tag_rejected() {
        assert!(matches!(
            Filter::exclude_tags(["ok", " "]),
            Err(RequestError::BlankTag)
        ));
    }

    #[test]
    fn test_empty_tag_filter_rejected() {
        assert!(matches!(
            Filter::include_tags(Vec::<String>::new()),
            Err(RequestError::EmptyTagFilter)
        ));
    }

    #[test]
    fn test_filter_serializes_with_kind() {
        let filter = Filter::by_name_pattern(".*Tests").unwrap();
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "name_pattern", "pattern": ".*Tests" })
        );
    }
}
