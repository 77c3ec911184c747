//! The discovery request handed to the engine, and the builder that assembles it.
//!
//! A [`DiscoveryRequest`] is immutable: the engine can only iterate its
//! selectors and filters in construction order. All accumulation happens in
//! [`DiscoveryRequestBuilder`], which is append-only and may be built any
//! number of times.

use serde::Serialize;
use tracing::debug;

use crate::candidate::Candidate;
use crate::filter::{Filter, FilterResult, FilterStage};
use crate::selector::{SelectionMode, Selector};

/// Errors raised while assembling a discovery request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("no arguments given: name-based selection needs at least one name")]
    MissingArguments,

    #[error("conflicting selection modes: request selects by {existing:?} and {attempted:?}")]
    ConflictingSelectionMode {
        existing: SelectionMode,
        attempted: SelectionMode,
    },

    #[error("a request needs at least one selector")]
    NoSelectors,

    #[error("name selector needs at least one name")]
    EmptyNameSelector,

    #[error("name at position {index} is blank")]
    BlankName { index: usize },

    #[error("invalid class-name pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("tags must not be blank")]
    BlankTag,

    #[error("tag filter needs at least one tag")]
    EmptyTagFilter,

    #[error("{kind} is a {stage}-filter and cannot be added as a {requested}-filter")]
    MisplacedFilter {
        kind: &'static str,
        stage: FilterStage,
        requested: FilterStage,
    },

    #[error("failed to enumerate classpath roots: {0}")]
    RootEnumeration(String),
}

/// Immutable aggregate of selectors and staged filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryRequest {
    selectors: Vec<Selector>,
    pre_filters: Vec<Filter>,
    post_filters: Vec<Filter>,
}

impl DiscoveryRequest {
    /// Start an empty builder.
    pub fn builder() -> DiscoveryRequestBuilder {
        DiscoveryRequestBuilder::new()
    }

    /// Selectors in the order they were added. Never empty.
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Name-only filters, in insertion order.
    pub fn pre_filters(&self) -> &[Filter] {
        &self.pre_filters
    }

    /// Filters that need tags, in insertion order.
    pub fn post_filters(&self) -> &[Filter] {
        &self.post_filters
    }

    /// The single selection mode shared by every selector.
    pub fn selection_mode(&self) -> SelectionMode {
        // `build` guarantees at least one selector and a single mode.
        self.selectors
            .first()
            .map(Selector::mode)
            .unwrap_or(SelectionMode::Names)
    }

    /// Run the pre-filters against a qualified name.
    ///
    /// Only the name is available at this point, so nothing tag-related is
    /// consulted.
    pub fn apply_pre_filters(&self, name: &str) -> FilterResult {
        run_stage(FilterStage::Pre, &self.pre_filters, &Candidate::new(name))
    }

    /// Run the post-filters against a fully resolved candidate.
    ///
    /// Every post-filter must include the candidate. An exclude filter that
    /// matches therefore wins over any include filter, whatever their order.
    pub fn apply_post_filters(&self, candidate: &Candidate) -> FilterResult {
        run_stage(FilterStage::Post, &self.post_filters, candidate)
    }

    /// Pre-filters then post-filters, stopping at the first exclusion.
    pub fn admits(&self, candidate: &Candidate) -> FilterResult {
        let pre = self.apply_pre_filters(&candidate.name);
        if pre.is_excluded() {
            return pre;
        }
        let post = self.apply_post_filters(candidate);
        if post.is_excluded() {
            return post;
        }
        FilterResult::included(format!("{}; {}", pre.reason(), post.reason()))
    }
}

fn run_stage(stage: FilterStage, filters: &[Filter], candidate: &Candidate) -> FilterResult {
    if filters.is_empty() {
        return FilterResult::included(format!("no {stage}-filters configured"));
    }
    let mut reasons = Vec::with_capacity(filters.len());
    for filter in filters {
        let result = filter.apply(candidate);
        if result.is_excluded() {
            debug!(
                candidate = %candidate.name,
                filter = filter.kind(),
                reason = result.reason(),
                "Candidate excluded"
            );
            return result;
        }
        reasons.push(result.reason().to_string());
    }
    FilterResult::included(reasons.join("; "))
}

/// Append-only accumulator for a [`DiscoveryRequest`].
///
/// Order of calls is order of evaluation. Selection-mode conflicts and
/// misplaced filters are reported by [`build`](Self::build), not when
/// appending.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRequestBuilder {
    selectors: Vec<Selector>,
    pre_filters: Vec<Filter>,
    post_filters: Vec<Filter>,
    misplaced: Vec<(&'static str, FilterStage, FilterStage)>,
}

impl DiscoveryRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a selector.
    pub fn add_selector(&mut self, selector: Selector) -> &mut Self {
        self.selectors.push(selector);
        self
    }

    /// Append a filter to the pre-filter sequence.
    pub fn add_pre_filter(&mut self, filter: Filter) -> &mut Self {
        self.place(FilterStage::Pre, filter);
        self
    }

    /// Append a filter to the post-filter sequence.
    pub fn add_post_filter(&mut self, filter: Filter) -> &mut Self {
        self.place(FilterStage::Post, filter);
        self
    }

    /// Append a filter to whichever sequence its stage belongs to.
    pub fn add_filter(&mut self, filter: Filter) -> &mut Self {
        let stage = filter.stage();
        self.place(stage, filter);
        self
    }

    fn place(&mut self, requested: FilterStage, filter: Filter) {
        let stage = filter.stage();
        if stage != requested {
            self.misplaced.push((filter.kind(), stage, requested));
            return;
        }
        match stage {
            FilterStage::Pre => self.pre_filters.push(filter),
            FilterStage::Post => self.post_filters.push(filter),
        }
    }

    /// Snapshot the accumulated state into a request.
    ///
    /// Does not reset the builder; building twice without further appends
    /// yields equal requests.
    pub fn build(&self) -> Result<DiscoveryRequest, RequestError> {
        let Some(first) = self.selectors.first() else {
            return Err(RequestError::NoSelectors);
        };
        let existing = first.mode();
        if let Some(other) = self.selectors.iter().find(|s| s.mode() != existing) {
            return Err(RequestError::ConflictingSelectionMode {
                existing,
                attempted: other.mode(),
            });
        }
        if let Some(&(kind, stage, requested)) = self.misplaced.first() {
            return Err(RequestError::MisplacedFilter {
                kind,
                stage,
                requested,
            });
        }

        debug!(
            selectors = self.selectors.len(),
            pre_filters = self.pre_filters.len(),
            post_filters = self.post_filters.len(),
            "Built discovery request"
        );

        Ok(DiscoveryRequest {
            selectors: self.selectors.clone(),
            pre_filters: self.pre_filters.clone(),
            post_filters: self.post_filters.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(n: &[&str]) -> Selector {
        Selector::by_names(n.iter().copied()).unwrap()
    }

    #[test]
    fn test_build_keeps_call_order() {
        let mut builder = DiscoveryRequest::builder();
        builder
            .add_selector(names(&["a.A"]))
            .add_selector(names(&["b.B"]))
            .add_post_filter(Filter::exclude_tags(["slow"]).unwrap())
            .add_post_filter(Filter::include_tags(["fast"]).unwrap())
            .add_pre_filter(Filter::by_name_pattern(".*").unwrap());

        let request = builder.build().unwrap();
        assert_eq!(request.selectors(), &[names(&["a.A"]), names(&["b.B"])]);
        assert_eq!(request.pre_filters().len(), 1);
        assert_eq!(request.post_filters()[0].kind(), "exclude_tags");
        assert_eq!(request.post_filters()[1].kind(), "include_tags");
        assert_eq!(request.selection_mode(), SelectionMode::Names);
    }

    #[test]
    fn test_build_is_idempotent_and_non_consuming() {
        let mut builder = DiscoveryRequest::builder();
        builder.add_selector(Selector::by_paths(["classes"]));
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);

        builder.add_filter(Filter::include_tags(["fast"]).unwrap());
        let third = builder.build().unwrap();
        assert_eq!(third.post_filters().len(), 1);
        assert!(first.post_filters().is_empty());
    }

    #[test]
    fn test_mixed_modes_fail_at_build() {
        let mut builder = DiscoveryRequest::builder();
        builder
            .add_selector(names(&["a.A"]))
            .add_selector(Selector::by_paths(["classes"]));
        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            RequestError::ConflictingSelectionMode {
                existing: SelectionMode::Names,
                attempted: SelectionMode::Roots,
            }
        ));
    }

    #[test]
    fn test_no_selectors_fails() {
        let builder = DiscoveryRequest::builder();
        assert!(matches!(builder.build(), Err(RequestError::NoSelectors)));
    }

    #[test]
    fn test_misplaced_filter_fails_at_build() {
        let mut builder = DiscoveryRequest::builder();
        builder
            .add_selector(names(&["a.A"]))
            .add_pre_filter(Filter::include_tags(["fast"]).unwrap());
        let err = builder.build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "include_tags is a post-filter and cannot be added as a pre-filter"
        );
    }

    #[test]
    fn test_add_filter_routes_by_stage() {
        let mut builder = DiscoveryRequest::builder();
        builder
            .add_selector(names(&["a.A"]))
            .add_filter(Filter::include_tags(["x"]).unwrap())
            .add_filter(Filter::by_name_pattern("a\\..*").unwrap());
        let request = builder.build().unwrap();
        assert_eq!(request.pre_filters().len(), 1);
        assert_eq!(request.post_filters().len(), 1);
    }

    #[test]
    fn test_exclusion_wins_regardless_of_order() {
        for include_first in [true, false] {
            let include = Filter::include_tags(["x"]).unwrap();
            let exclude = Filter::exclude_tags(["x"]).unwrap();
            let mut builder = DiscoveryRequest::builder();
            builder.add_selector(names(&["a.A"]));
            if include_first {
                builder.add_post_filter(include).add_post_filter(exclude);
            } else {
                builder.add_post_filter(exclude).add_post_filter(include);
            }
            let request = builder.build().unwrap();
            let candidate = Candidate::new("a.A").with_tags(["x"]);
            let result = request.apply_post_filters(&candidate);
            assert_eq!(result, FilterResult::excluded("carries excluded tag 'x'"));
        }
    }

    #[test]
    fn test_admits_prunes_on_name_first() {
        let mut builder = DiscoveryRequest::builder();
        builder
            .add_selector(Selector::by_paths(["classes"]))
            .add_filter(Filter::by_name_pattern(".*Tests").unwrap())
            .add_filter(Filter::exclude_tags(["slow"]).unwrap());
        let request = builder.build().unwrap();

        let helper = Candidate::new("a.Helper").with_tags(["slow"]);
        let result = request.admits(&helper);
        assert_eq!(
            result,
            FilterResult::excluded("name 'a.Helper' does not match pattern '.*Tests'")
        );

        let kept = Candidate::new("a.MathTests");
        assert!(request.admits(&kept).is_included());
    }

    #[test]
    fn test_unfiltered_request_admits_everything() {
        let mut builder = DiscoveryRequest::builder();
        builder.add_selector(names(&["a.A"]));
        let request = builder.build().unwrap();
        let result = request.admits(&Candidate::new("anything"));
        assert_eq!(
            result,
            FilterResult::included("no pre-filters configured; no post-filters configured")
        );
    }

    #[test]
    fn test_request_serializes_in_order() {
        let mut builder = DiscoveryRequest::builder();
        builder
            .add_selector(names(&["b.B", "a.A"]))
            .add_filter(Filter::exclude_tags(["slow"]).unwrap());
        let json = serde_json::to_value(builder.build().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "selectors": [{ "kind": "names", "names": ["b.B", "a.A"] }],
                "pre_filters": [],
                "post_filters": [{ "kind": "exclude_tags", "tags": ["slow"] }],
            })
        );
    }
}
