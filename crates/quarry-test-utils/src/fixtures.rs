//! Fake collaborators and on-disk fixtures.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use quarry_core::{RequestError, RootEnumerator, RuntimeEnvironment, RuntimeError};
use tempfile::TempDir;

/// A root enumerator that returns a fixed set of paths.
#[derive(Debug, Clone, Default)]
pub struct FixedRoots {
    roots: BTreeSet<PathBuf>,
}

impl FixedRoots {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &BTreeSet<PathBuf> {
        &self.roots
    }
}

impl RootEnumerator for FixedRoots {
    fn all_classpath_roots(&self) -> Result<BTreeSet<PathBuf>, RequestError> {
        Ok(self.roots.clone())
    }
}

/// A runtime whose detection always fails, as when no launcher is installed.
#[derive(Debug, Clone, Default)]
pub struct FailingRuntime;

impl RuntimeEnvironment for FailingRuntime {
    fn current_version(&self) -> Result<String, RuntimeError> {
        Err(RuntimeError::NotReported {
            command: "java".to_string(),
        })
    }
}

/// A temporary classpath made of real directories and archive files.
///
/// The backing directory is deleted when this value is dropped.
pub struct TempClasspath {
    dirs: Vec<PathBuf>,
    archives: Vec<PathBuf>,
    _temp_dir: TempDir,
}

impl TempClasspath {
    /// Create `dirs` as directories and `archives` as small files.
    pub fn new(dirs: &[&str], archives: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let dirs = dirs
            .iter()
            .map(|name| {
                let path = temp_dir.path().join(name);
                std::fs::create_dir_all(&path).expect("failed to create classpath dir");
                path
            })
            .collect();
        let archives = archives
            .iter()
            .map(|name| {
                let path = temp_dir.path().join(name);
                std::fs::write(&path, b"PK\x03\x04").expect("failed to write archive");
                path
            })
            .collect();
        Self {
            dirs,
            archives,
            _temp_dir: temp_dir,
        }
    }

    /// The temporary directory holding every entry.
    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }

    /// The directory entries, in creation order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// A platform-separated classpath string listing archives, then dirs.
    pub fn classpath(&self) -> OsString {
        std::env::join_paths(self.archives.iter().chain(self.dirs.iter()))
            .expect("classpath entries contain a separator")
    }
}
