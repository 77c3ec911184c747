#![deny(unsafe_code)]

//! Quarry core: discovery requests for a test engine.
//!
//! Turns user-supplied selection criteria (explicit names, root directories,
//! a class-name pattern, include/exclude tags) into an immutable
//! [`DiscoveryRequest`]. The engine consuming the request applies its
//! pre-filters while walking roots and its post-filters once candidate tags
//! are resolved, optionally consulting a [`ConditionEvaluator`] per
//! candidate.
//!
//! ```text
//! RunOptions ──► RequestTranslator ──► DiscoveryRequestBuilder ──► DiscoveryRequest ──► engine
//!                     │
//!                     └── RootEnumerator (classpath roots, run-all mode only)
//! ```

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Candidate units as seen by filters.
pub mod candidate;
/// Runtime-range conditions and their evaluator.
pub mod condition;
/// Staged filters: name pattern (pre) and tag include/exclude (post).
pub mod filter;
/// The immutable request and its append-only builder.
pub mod request;
/// Classpath root enumeration.
pub mod roots;
/// Runtime version detection.
pub mod runtime;
/// Name and root-path selectors.
pub mod selector;
/// Run options to request translation.
pub mod translator;
/// Structured, numerically ordered versions.
pub mod version;

pub use candidate::Candidate;
pub use condition::{
    ConditionError, ConditionEvaluator, ConditionResult, ConditionState, RangeDeclaration,
    RuntimeCondition,
};
pub use filter::{Filter, FilterResult, FilterStage, NamePattern};
pub use request::{DiscoveryRequest, DiscoveryRequestBuilder, RequestError};
pub use roots::ClasspathRoots;
pub use runtime::{FixedRuntime, JavaRuntime, RuntimeEnvironment, RuntimeError};
pub use selector::{SelectionMode, Selector};
pub use translator::{RequestTranslator, RootEnumerator, RunOptions};
pub use version::{Version, VersionError};
