//! Fuzz target for `quarry.toml` parsing.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text through `AppConfig::parse()` and, when it parses,
//! through `RunOptions::from_config()` so pattern compilation is covered too.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = quarry_config::AppConfig::parse(s) {
        let _ = quarry_core::RunOptions::from_config(&config.discovery);
    }
});
