//! Structured runtime versions.
//!
//! Versions are compared component-wise as integers, never as strings, so
//! `9 < 10 < 11.0.2`. Trailing zero components are insignificant:
//! `11 == 11.0 == 11.0.0`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Errors produced when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,

    #[error("malformed version {input:?}: {reason}")]
    Malformed { input: String, reason: &'static str },
}

/// An ordered tuple of numeric components.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u32>,
}

impl Version {
    /// Build a version from raw components. At least one is required.
    pub fn from_components(components: Vec<u32>) -> Option<Self> {
        if components.is_empty() {
            None
        } else {
            Some(Self { components })
        }
    }

    /// Parse a runtime version string.
    ///
    /// Accepted forms include `11.0.2`, `17`, `21-ea`, `11.0.2+9`,
    /// `1.8.0_292` and prefixed bounds such as `JRE-11` or `java-9`. The
    /// legacy `1.N` scheme is folded to `N`, and a `_NNN` update suffix
    /// becomes a trailing component.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        let malformed = |reason| VersionError::Malformed {
            input: input.to_string(),
            reason,
        };

        let digits_at = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| malformed("no numeric component"))?;
        let (prefix, rest) = trimmed.split_at(digits_at);
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphabetic() || matches!(c, '-' | '_' | ' '))
        {
            return Err(malformed("unexpected characters before the version number"));
        }

        let numeric_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (numeric, qualifier) = rest.split_at(numeric_end);

        let mut components = numeric
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    Err(malformed("empty component"))
                } else {
                    part.parse::<u32>()
                        .map_err(|_| malformed("component out of range"))
                }
            })
            .collect::<Result<Vec<u32>, _>>()?;

        if components.len() > 1 && components[0] == 1 {
            components.remove(0);
        }

        if let Some(update) = qualifier.strip_prefix('_') {
            let digits: String = update.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return Err(malformed("update suffix has no number"));
            }
            components.push(
                digits
                    .parse()
                    .map_err(|_| malformed("component out of range"))?,
            );
        } else if !(qualifier.is_empty() || qualifier.starts_with(['-', '+'])) {
            return Err(malformed("unexpected qualifier"));
        }

        Ok(Self { components })
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    /// Compare against `bound` using only as many components as the bound has.
    ///
    /// `11.0.2` is [`Equal`](Ordering::Equal) to a bound of `11`, so it sits
    /// inside a range whose maximum is `11`.
    pub fn cmp_at_precision(&self, bound: &Version) -> Ordering {
        let width = bound.components.len();
        let truncated = Version {
            components: self.components.iter().copied().take(width).collect(),
        };
        truncated.cmp(bound)
    }

    fn component(&self, index: usize) -> u32 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.components.len().max(other.components.len());
        (0..width)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .components
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&rendered)
    }
}
