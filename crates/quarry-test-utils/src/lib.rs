#![deny(unsafe_code)]

//! Shared test utilities for the Quarry workspace.
//!
//! Provides fake collaborators and config builders so that
//! integration tests across crates stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! quarry-test-utils = { workspace = true }
//! ```
//!
//! Only use it from `tests/` integration tests: a crate's own unit tests see
//! a different copy of its types than the one this crate links against.

pub mod config;
pub mod fixtures;

pub use fixtures::{FailingRuntime, FixedRoots, TempClasspath};
