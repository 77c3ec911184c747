//! Turns run options into a [`DiscoveryRequest`].
//!
//! Selection and filtering are two independent passes. The translator first
//! picks exactly one selection branch (scan roots, or explicit names), then
//! layers the same filters on top whichever branch was taken.

use std::collections::BTreeSet;
use std::path::PathBuf;

use quarry_config::DiscoveryConfig;
use tracing::{debug, info, warn};

use crate::filter::{Filter, NamePattern};
use crate::request::{DiscoveryRequest, RequestError};
use crate::selector::Selector;

/// Source of classpath root directories for "run all tests" mode.
pub trait RootEnumerator {
    /// Every root directory on the classpath.
    fn all_classpath_roots(&self) -> Result<BTreeSet<PathBuf>, RequestError>;
}

impl<T: RootEnumerator + ?Sized> RootEnumerator for &T {
    fn all_classpath_roots(&self) -> Result<BTreeSet<PathBuf>, RequestError> {
        (**self).all_classpath_roots()
    }
}

/// Externally supplied selection criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Scan roots instead of resolving explicit names.
    pub run_all_tests: bool,
    /// Names in name mode; root paths in run-all mode.
    pub arguments: Vec<String>,
    /// Pre-filter on qualified names.
    pub class_name_pattern: Option<NamePattern>,
    /// Keep candidates carrying at least one of these.
    pub include_tags: BTreeSet<String>,
    /// Drop candidates carrying any of these.
    pub exclude_tags: BTreeSet<String>,
}

impl RunOptions {
    /// Options seeded from the `[discovery]` config section.
    ///
    /// Configured extra roots are not arguments; they are handed to the
    /// root enumerator instead.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, RequestError> {
        let class_name_pattern = config
            .class_name_pattern
            .as_deref()
            .map(NamePattern::new)
            .transpose()?;
        Ok(Self {
            run_all_tests: config.scan_classpath,
            arguments: Vec::new(),
            class_name_pattern,
            include_tags: config.include_tags.iter().cloned().collect(),
            exclude_tags: config.exclude_tags.iter().cloned().collect(),
        })
    }
}

/// Stateless mapping from [`RunOptions`] to a [`DiscoveryRequest`].
#[derive(Debug, Clone)]
pub struct RequestTranslator<R> {
    roots: R,
}

impl<R: RootEnumerator> RequestTranslator<R> {
    pub fn new(roots: R) -> Self {
        Self { roots }
    }

    /// Build the request for one discovery run.
    ///
    /// Fails with [`RequestError::MissingArguments`] when names are required
    /// but none were given. Nothing is partially built on failure.
    pub fn to_discovery_request(
        &self,
        options: &RunOptions,
    ) -> Result<DiscoveryRequest, RequestError> {
        let mut builder = DiscoveryRequest::builder();

        if options.run_all_tests {
            let roots = self.root_directories(options)?;
            if roots.is_empty() {
                warn!("No root directories to scan; the request will discover nothing");
            }
            debug!(roots = roots.len(), "Selecting by classpath roots");
            builder.add_selector(Selector::by_paths(roots));
        } else {
            if options.arguments.is_empty() {
                return Err(RequestError::MissingArguments);
            }
            debug!(names = options.arguments.len(), "Selecting by name");
            builder.add_selector(Selector::by_names(options.arguments.iter().cloned())?);
        }

        if let Some(pattern) = &options.class_name_pattern {
            builder.add_pre_filter(Filter::NamePattern {
                pattern: pattern.clone(),
            });
        }
        if !options.include_tags.is_empty() {
            builder.add_post_filter(Filter::include_tags(&options.include_tags)?);
        }
        if !options.exclude_tags.is_empty() {
            builder.add_post_filter(Filter::exclude_tags(&options.exclude_tags)?);
        }

        let request = builder.build()?;
        info!(
            mode = ?request.selection_mode(),
            pre_filters = request.pre_filters().len(),
            post_filters = request.post_filters().len(),
            "Discovery request ready"
        );
        Ok(request)
    }

    fn root_directories(&self, options: &RunOptions) -> Result<BTreeSet<PathBuf>, RequestError> {
        if options.arguments.is_empty() {
            return self.roots.all_classpath_roots();
        }
        Ok(options.arguments.iter().map(PathBuf::from).collect())
    }
}
