#![no_main]

use libfuzzer_sys::fuzz_target;
use remedi::resolver::minimal_fix;
use remedi::version::{compare, parse_exact_version};
use std::cmp::Ordering;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let (a, b) = content.split_once('\n').unwrap_or((content, ""));

        assert_eq!(compare(a, a), Ordering::Equal, "compare must be reflexive");
        assert_eq!(compare(b, b), Ordering::Equal, "compare must be reflexive");
        assert_eq!(
            compare(a, b),
            compare(b, a).reverse(),
            "compare must be antisymmetric"
        );

        if let Some(exact) = parse_exact_version(b) {
            assert!(!exact.is_empty(), "exact version must be non-empty");
            assert!(
                b.contains(exact),
                "exact version must be a substring of the expression"
            );
        }

        if let Some(fix) = minimal_fix(a, [b]) {
            let trimmed = a.trim();
            let current = trimmed.strip_prefix('v').unwrap_or(trimmed);
            assert_eq!(
                compare(&fix, current),
                Ordering::Greater,
                "resolved fix must be above the current version"
            );
        }
    }
});
