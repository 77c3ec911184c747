//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values
//! without repeating boilerplate across crate boundaries.

use std::path::PathBuf;

use quarry_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .scan_classpath(true)
///     .exclude_tag("slow")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn scan_classpath(mut self, enabled: bool) -> Self {
        self.config.discovery.scan_classpath = enabled;
        self
    }

    pub fn class_name_pattern(mut self, pattern: &str) -> Self {
        self.config.discovery.class_name_pattern = Some(pattern.to_string());
        self
    }

    pub fn include_tag(mut self, tag: &str) -> Self {
        self.config.discovery.include_tags.push(tag.to_string());
        self
    }

    pub fn exclude_tag(mut self, tag: &str) -> Self {
        self.config.discovery.exclude_tags.push(tag.to_string());
        self
    }

    pub fn extra_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.discovery.extra_roots.push(root.into());
        self
    }

    pub fn runtime_version(mut self, version: &str) -> Self {
        self.config.runtime.version = Some(version.to_string());
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
