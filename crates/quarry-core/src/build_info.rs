//! Identifies which Quarry build produced a discovery request.
//!
//! `build.rs` records the `git describe` output, the build time (honouring
//! `SOURCE_DATE_EPOCH` for reproducible builds) and the cargo profile. The
//! CLI prints them for `quarry version` and logs them when it starts, so a
//! request dump in a bug report can be matched to the binary that made it.

/// `git describe --always --dirty` at build time, or `unknown` outside a checkout.
pub const GIT_HASH: &str = env!("QUARRY_GIT_HASH");

/// The build timestamp as a Unix epoch string.
pub const BUILD_TIMESTAMP: &str = env!("QUARRY_BUILD_TIMESTAMP");

/// The build profile (`debug` or `release`).
pub const BUILD_PROFILE: &str = env!("QUARRY_BUILD_PROFILE");

/// The crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Return a formatted version string including git hash and profile.
///
/// Example: `"0.1.0 (abc1234, debug)"`
pub fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH}, {BUILD_PROFILE})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_mentions_crate_version() {
        let v = version_string();
        assert!(v.starts_with(VERSION));
        assert!(v.contains(GIT_HASH));
    }

    #[test]
    fn test_timestamp_is_numeric() {
        assert!(BUILD_TIMESTAMP.chars().all(|c| c.is_ascii_digit()));
    }
}
