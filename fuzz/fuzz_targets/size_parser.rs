//! Fuzz target for size expression parsing
//!
//! Any input either parses into a well-formed spec or is rejected.

#![no_main]

use libfuzzer_sys::fuzz_target;
use truncpad_core::calc::resolve;
use truncpad_core::{Modifier, SizeParser, SizeSpec, parse_pad_byte};

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_pad_byte(token);

    let Ok(spec) = token.parse::<SizeSpec>() else {
        return;
    };

    if spec.modifier.is_rounding() {
        assert!(spec.magnitude > 0);
    }
    if spec.modifier != Modifier::RelativeDelta {
        assert!(spec.magnitude >= 0);
    }

    // Display output reparses to the same spec
    let reparsed: SizeSpec = spec.to_string().parse().expect("display reparses");
    assert_eq!(reparsed, spec);

    // A narrower offset range accepts a subset with identical results
    let narrow = SizeParser::with_offset_range(i64::from(i32::MIN), i64::from(i32::MAX));
    if let Ok(bounded) = narrow.parse(token) {
        assert_eq!(bounded, spec);
    }

    for base in [0, 1, 4096, i64::MAX] {
        if let Ok(size) = resolve(spec, base, None) {
            assert!(size >= 0);
        }
    }
});
