//! Selectors describe *where* the engine looks for candidates.
//!
//! A selector is a plain value: it carries names or root paths but never
//! touches the filesystem. Whether a root actually exists is for the engine
//! to find out while walking it.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::request::RequestError;

/// How a request selects candidates. A request never mixes modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Explicit fully-qualified names.
    Names,
    /// Recursive scan of root directories.
    Roots,
}

/// Where to look for candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// Explicit fully-qualified test identifiers, in the order given.
    Names { names: Vec<String> },
    /// Filesystem or classpath roots to scan recursively.
    Paths { roots: BTreeSet<PathBuf> },
}

impl Selector {
    /// Select candidates by fully-qualified name.
    ///
    /// Order is preserved and duplicates are kept; the engine resolves each
    /// name as given.
    pub fn by_names<I, S>(names: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(RequestError::EmptyNameSelector);
        }
        if let Some(index) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(RequestError::BlankName { index });
        }
        Ok(Selector::Names { names })
    }

    /// Select every candidate below the given roots. Duplicate roots collapse.
    ///
    /// An empty root set is legal and simply discovers nothing.
    pub fn by_paths<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Selector::Paths {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// The selection mode this selector belongs to.
    pub fn mode(&self) -> SelectionMode {
        match self {
            Selector::Names { .. } => SelectionMode::Names,
            Selector::Paths { .. } => SelectionMode::Roots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_names_keep_order() {
        let selector = Selector::by_names(["b.Second", "a.First"]).unwrap();
        assert_eq!(
            selector,
            Selector::Names {
                names: vec!["b.Second".to_string(), "a.First".to_string()]
            }
        );
        assert_eq!(selector.mode(), SelectionMode::Names);
    }

    #[test]
    fn test_empty_names_rejected() {
        let err = Selector::by_names(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, RequestError::EmptyNameSelector));
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = Selector::by_names(["a.First", "  "]).unwrap_err();
        assert!(matches!(err, RequestError::BlankName { index: 1 }));
    }

    #[test]
    fn test_paths_collapse_duplicates() {
        let selector = Selector::by_paths(["a", "a", "b"]);
        let Selector::Paths { roots } = &selector else {
            panic!("expected a path selector");
        };
        assert_eq!(
            roots.iter().cloned().collect::<Vec<_>>(),
            vec![PathBuf::from("a"), PathBuf::from("b")]
        );
        assert_eq!(selector.mode(), SelectionMode::Roots);
    }

    #[test]
    fn test_paths_are_not_checked_for_existence() {
        let selector = Selector::by_paths(["/definitely/not/here"]);
        assert_eq!(selector.mode(), SelectionMode::Roots);
    }

    #[test]
    fn test_empty_paths_allowed() {
        let selector = Selector::by_paths(Vec::<PathBuf>::new());
        assert_eq!(
            selector,
            Selector::Paths {
                roots: BTreeSet::new()
            }
        );
    }
}
