//! Property tests across parsing, resolution and real files

use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;
use truncpad_core::calc::resolve;
use truncpad_core::size::parse;
use truncpad_core::{Modifier, ResizeEngine, ResizeRequest, SizeSpec};
use truncpad_integration_tests::{file_with, len_of};

fn modifier_strategy() -> impl Strategy<Value = (char, Modifier)> {
    prop_oneof![
        Just(('+', Modifier::RelativeDelta)),
        Just(('-', Modifier::RelativeDelta)),
        Just(('<', Modifier::AtMost)),
        Just(('>', Modifier::AtLeast)),
        Just(('/', Modifier::RoundDown)),
        Just(('%', Modifier::RoundUp)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_display_reparses((prefix, modifier) in modifier_strategy(), n in 1i64..1 << 40) {
        let spec = parse(&format!("{prefix}{n}")).unwrap();
        prop_assert_eq!(spec.modifier, modifier);

        let reparsed: SizeSpec = spec.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, spec);
    }

    #[test]
    fn prop_file_length_matches_resolution(
        (prefix, _) in modifier_strategy(),
        n in 1i64..1 << 16,
        start in 0usize..1 << 14,
    ) {
        let dir = TempDir::new().unwrap();
        let file = file_with(&dir, "p.dat", 3, start);
        let spec = parse(&format!("{prefix}{n}")).unwrap();
        let expected = resolve(spec, start as i64, None).unwrap();

        ResizeEngine::new(ResizeRequest::new(spec)).apply(&[&file]).unwrap();

        prop_assert_eq!(len_of(&file), expected as u64);
    }

    #[test]
    fn prop_padding_fills_exactly_the_new_range(
        start in 0usize..1 << 13,
        grow in 0i64..1 << 15,
        byte in any::<u8>(),
    ) {
        let dir = TempDir::new().unwrap();
        let old_byte = byte.wrapping_add(1);
        let file = file_with(&dir, "p.dat", old_byte, start);

        let mut request = ResizeRequest::new(parse(&format!("+{grow}")).unwrap());
        request.pad_byte = Some(byte);
        ResizeEngine::new(request).apply(&[&file]).unwrap();

        let data = fs::read(&file).unwrap();
        prop_assert_eq!(data.len(), start + grow as usize);
        prop_assert!(data[..start].iter().all(|&b| b == old_byte));
        prop_assert!(data[start..].iter().all(|&b| b == byte));
    }
}
