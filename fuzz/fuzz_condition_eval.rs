//! Fuzz target for version parsing and range evaluation.
//!
//! Run with: cargo +nightly fuzz run fuzz_condition_eval
//!
//! Splits the input into a runtime version and two bounds. Evaluation must
//! return a result or an error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry_core::{ConditionEvaluator, FixedRuntime, RangeDeclaration, RuntimeCondition};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let mut parts = s.splitn(3, '|');
    let current = parts.next().unwrap_or_default();
    let min = parts.next().filter(|p| !p.is_empty());
    let max = parts.next().filter(|p| !p.is_empty());

    let _ = quarry_core::Version::parse(current);

    let evaluator = ConditionEvaluator::new(FixedRuntime::new(current));
    let declaration = RangeDeclaration::new(min, max);
    for condition in [
        RuntimeCondition::EnabledForRange(declaration.clone()),
        RuntimeCondition::DisabledForRange(declaration),
    ] {
        let _ = evaluator.evaluate("fuzz.Candidate", Some(&condition));
    }
});
