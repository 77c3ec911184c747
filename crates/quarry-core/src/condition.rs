//! Runtime-range conditions evaluated per candidate.
//!
//! A candidate may declare that it only runs (or never runs) on a range of
//! runtime versions. The [`ConditionEvaluator`] turns that declaration and
//! the current runtime version into a [`ConditionResult`] whose reason
//! always names the detected version.
//!
//! Bounds are inclusive and compared at the bound's own precision, so a
//! maximum of `12` admits `12.0.2`. A missing bound leaves that side open.
//! Malformed or inverted bounds are configuration errors and are reported
//! with the candidate's identity instead of defaulting either way.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::filter::FilterResult;
use crate::runtime::{RuntimeEnvironment, RuntimeError};
use crate::version::{Version, VersionError};

/// Reason given when a candidate declares no runtime condition.
pub const CONDITION_NOT_PRESENT: &str = "runtime range condition is not present";

/// Whether a candidate may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionState {
    Enabled,
    Disabled,
}

impl fmt::Display for ConditionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionState::Enabled => f.write_str("ENABLED"),
            ConditionState::Disabled => f.write_str("DISABLED"),
        }
    }
}

/// Outcome of a single condition evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionResult {
    pub state: ConditionState,
    pub reason: String,
}

impl ConditionResult {
    /// The candidate may run; `reason` says why.
    pub fn enabled(reason: impl Into<String>) -> Self {
        Self {
            state: ConditionState::Enabled,
            reason: reason.into(),
        }
    }

    /// The candidate is skipped; `reason` says why.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            state: ConditionState::Disabled,
            reason: reason.into(),
        }
    }

    /// Whether the state is [`ConditionState::Enabled`].
    pub fn is_enabled(&self) -> bool {
        self.state == ConditionState::Enabled
    }
}

/// A disabled condition excludes the candidate, like any other post-filter.
impl From<ConditionResult> for FilterResult {
    fn from(result: ConditionResult) -> Self {
        match result.state {
            ConditionState::Enabled => FilterResult::included(result.reason),
            ConditionState::Disabled => FilterResult::excluded(result.reason),
        }
    }
}

/// Raw version bounds as declared on a candidate.
///
/// Bounds stay unparsed until evaluation so that a malformed bound is
/// reported against the candidate that declared it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeDeclaration {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl RangeDeclaration {
    pub fn new(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: min.map(str::to_string),
            max: max.map(str::to_string),
        }
    }

    /// Inclusive range `[min, max]`.
    pub fn between(min: &str, max: &str) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// `[min, ...)`.
    pub fn at_least(min: &str) -> Self {
        Self::new(Some(min), None)
    }

    /// `(..., max]`.
    pub fn at_most(max: &str) -> Self {
        Self::new(None, Some(max))
    }

    /// Neither bound given.
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// The recognised condition kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCondition {
    /// Run only when the runtime version is inside the range.
    EnabledForRange(RangeDeclaration),
    /// Skip when the runtime version is inside the range.
    DisabledForRange(RangeDeclaration),
}

impl RuntimeCondition {
    fn declaration(&self) -> &RangeDeclaration {
        match self {
            RuntimeCondition::EnabledForRange(range)
            | RuntimeCondition::DisabledForRange(range) => range,
        }
    }
}

/// Errors raised while evaluating a condition. Each names the candidate.
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    #[error("{candidate}: malformed {side} bound: {source}")]
    MalformedBound {
        candidate: String,
        side: &'static str,
        #[source]
        source: VersionError,
    },

    #[error("{candidate}: malformed runtime version: {source}")]
    MalformedRuntimeVersion {
        candidate: String,
        #[source]
        source: VersionError,
    },

    #[error("{candidate}: range minimum {min} must be less than or equal to maximum {max}")]
    InvertedRange {
        candidate: String,
        min: String,
        max: String,
    },

    #[error("{candidate}: {source}")]
    Runtime {
        candidate: String,
        #[source]
        source: RuntimeError,
    },
}

#[derive(Debug)]
struct ParsedRange {
    min: Option<Version>,
    max: Option<Version>,
}

impl ParsedRange {
    fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    fn contains(&self, current: &Version) -> bool {
        let above_min = self
            .min
            .as_ref()
            .is_none_or(|min| current.cmp_at_precision(min) != Ordering::Less);
        let below_max = self
            .max
            .as_ref()
            .is_none_or(|max| current.cmp_at_precision(max) != Ordering::Greater);
        above_min && below_max
    }
}

impl fmt::Display for ParsedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: &Option<Version>| v.as_ref().map_or("any".to_string(), Version::to_string);
        write!(f, "[{}, {}]", side(&self.min), side(&self.max))
    }
}

/// Evaluates runtime conditions against one runtime environment.
///
/// Evaluation has no side effects and can be called from many workers at
/// once.
#[derive(Debug, Clone)]
pub struct ConditionEvaluator<E> {
    runtime: E,
}

impl<E: RuntimeEnvironment> ConditionEvaluator<E> {
    pub fn new(runtime: E) -> Self {
        Self { runtime }
    }

    /// Evaluate the condition declared by `candidate`, if any.
    pub fn evaluate(
        &self,
        candidate: &str,
        condition: Option<&RuntimeCondition>,
    ) -> Result<ConditionResult, ConditionError> {
        let Some(condition) = condition else {
            return Ok(ConditionResult::enabled(CONDITION_NOT_PRESENT));
        };

        let range = parse_declaration(candidate, condition.declaration())?;

        let raw = self
            .runtime
            .current_version()
            .map_err(|source| ConditionError::Runtime {
                candidate: candidate.to_string(),
                source,
            })?;
        let raw = raw.trim();
        let current =
            Version::parse(raw).map_err(|source| ConditionError::MalformedRuntimeVersion {
                candidate: candidate.to_string(),
                source,
            })?;

        let result = if range.is_unbounded() {
            ConditionResult::enabled(format!("Enabled on runtime version: {raw}"))
        } else {
            let inside = range.contains(&current);
            let enabled = match condition {
                RuntimeCondition::EnabledForRange(_) => inside,
                RuntimeCondition::DisabledForRange(_) => !inside,
            };
            let placement = if inside { "in" } else { "outside" };
            if enabled {
                ConditionResult::enabled(format!(
                    "Enabled on runtime version: {raw} ({placement} range {range})"
                ))
            } else {
                ConditionResult::disabled(format!(
                    "Disabled on runtime version: {raw} ({placement} range {range})"
                ))
            }
        };

        debug!(
            candidate,
            state = %result.state,
            reason = %result.reason,
            "Evaluated runtime condition"
        );
        Ok(result)
    }
}

fn parse_declaration(
    candidate: &str,
    declaration: &RangeDeclaration,
) -> Result<ParsedRange, ConditionError> {
    let bound = |raw: &Option<String>, side: &'static str| {
        raw.as_deref()
            .map(Version::parse)
            .transpose()
            .map_err(|source| ConditionError::MalformedBound {
                candidate: candidate.to_string(),
                side,
                source,
            })
    };
    let range = ParsedRange {
        min: bound(&declaration.min, "min")?,
        max: bound(&declaration.max, "max")?,
    };

    // Empty only when the minimum, cut to the maximum's precision, exceeds it:
    // `[11.0.5, 11]` still admits `11.0.7`.
    if let (Some(min), Some(max)) = (&range.min, &range.max) {
        if min.cmp_at_precision(max) == Ordering::Greater {
            return Err(ConditionError::InvertedRange {
                candidate: candidate.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }
    Ok(range)
}
