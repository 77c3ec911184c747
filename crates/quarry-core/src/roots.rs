//! Classpath root enumeration.
//!
//! [`ClasspathRoots`] reads a platform-separated classpath (by default the
//! `CLASSPATH` environment variable) and keeps the entries that are
//! directories. Archives and missing entries cannot be scanned as roots and
//! are skipped with a warning.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::request::RequestError;
use crate::translator::RootEnumerator;

/// Environment variable consulted by [`ClasspathRoots::from_env`].
pub const CLASSPATH_ENV: &str = "CLASSPATH";

/// Root enumerator backed by a classpath string.
#[derive(Debug, Clone, Default)]
pub struct ClasspathRoots {
    classpath: Option<OsString>,
    extra_roots: Vec<PathBuf>,
}

impl ClasspathRoots {
    /// Use the given classpath string.
    pub fn new(classpath: impl Into<OsString>) -> Self {
        Self {
            classpath: Some(classpath.into()),
            extra_roots: Vec::new(),
        }
    }

    /// Use the `CLASSPATH` environment variable, if set.
    pub fn from_env() -> Self {
        Self {
            classpath: std::env::var_os(CLASSPATH_ENV),
            extra_roots: Vec::new(),
        }
    }

    /// Also consider these roots (e.g. from `discovery.extra_roots`).
    pub fn with_extra_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.extra_roots.extend(roots.into_iter().map(Into::into));
        self
    }
}

impl RootEnumerator for ClasspathRoots {
    fn all_classpath_roots(&self) -> Result<BTreeSet<PathBuf>, RequestError> {
        let entries = self
            .classpath
            .as_deref()
            .map(|cp| std::env::split_paths(cp).collect::<Vec<_>>())
            .unwrap_or_default();

        let mut roots = BTreeSet::new();
        for entry in entries.iter().chain(self.extra_roots.iter()) {
            if entry.as_os_str().is_empty() {
                continue;
            }
            if is_root_directory(entry) {
                roots.insert(entry.clone());
            } else {
                warn!(entry = %entry.display(), "Skipping classpath entry that is not a directory");
            }
        }

        debug!(roots = roots.len(), "Enumerated classpath roots");
        Ok(roots)
    }
}

fn is_root_directory(path: &Path) -> bool {
    path.metadata().map(|m| m.is_dir()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_keeps_only_directories() {
        let tmp = TempDir::new().unwrap();
        let classes = tmp.path().join("classes");
        let test_classes = tmp.path().join("test-classes");
        let jar = tmp.path().join("lib.jar");
        let missing = tmp.path().join("missing");
        std::fs::create_dir(&classes).unwrap();
        std::fs::create_dir(&test_classes).unwrap();
        std::fs::write(&jar, b"PK").unwrap();

        let classpath =
            std::env::join_paths([&classes, &jar, &missing, &test_classes, &classes]).unwrap();
        let roots = ClasspathRoots::new(classpath).all_classpath_roots().unwrap();

        assert_eq!(
            roots.into_iter().collect::<Vec<_>>(),
            vec![classes, test_classes]
        );
    }

    #[test]
    fn test_extra_roots_are_added() {
        let tmp = TempDir::new().unwrap();
        let extra = tmp.path().join("extra");
        std::fs::create_dir(&extra).unwrap();

        let roots = ClasspathRoots::default()
            .with_extra_roots([extra.clone(), tmp.path().join("gone")])
            .all_classpath_roots()
            .unwrap();
        assert_eq!(roots.into_iter().collect::<Vec<_>>(), vec![extra]);
    }

    #[test]
    fn test_unset_classpath_is_empty() {
        let roots = ClasspathRoots::default().all_classpath_roots().unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn test_empty_entries_ignored() {
        let roots = ClasspathRoots::new("").all_classpath_roots().unwrap();
        assert!(roots.is_empty());
    }
}
