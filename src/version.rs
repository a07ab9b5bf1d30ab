//! Loose version comparison and Maven-style range parsing.
//!
//! Scanner output mixes plain versions ("1.2.3"), prefixed tags
//! ("v1.2.3"), suffixed builds ("1.2.3-rc1") and Maven/OSGi range
//! expressions ("[1.2.3, 2.0.0)") for the same field, so the comparator
//! here is deliberately looser than semver: it never rejects an input,
//! it just orders whatever it is given deterministically.

use std::cmp::Ordering;

/// Compares two version strings.
///
/// Both sides are normalized by trimming whitespace and stripping a single
/// leading `v`, then split on `.`; missing trailing segments count as zero.
/// Each segment splits into a leading digit run and a suffix: digit runs
/// compare numerically (leading zeros ignored, any length), suffixes
/// lexicographically, and a segment that starts with a digit outranks one
/// that does not. Fully non-numeric segments compare lexicographically.
pub fn compare(a: &str, b: &str) -> Ordering {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return Ordering::Equal;
    }

    let a_segments: Vec<&str> = a.split('.').collect();
    let b_segments: Vec<&str> = b.split('.').collect();
    let len = a_segments.len().max(b_segments.len());
    for i in 0..len {
        let left = a_segments.get(i).copied().unwrap_or("0");
        let right = b_segments.get(i).copied().unwrap_or("0");
        let ordering = compare_segment(left, right);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn normalize(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed)
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let (a_digits, a_suffix) = split_digit_run(a);
    let (b_digits, b_suffix) = split_digit_run(b);
    match (a_digits.is_empty(), b_digits.is_empty()) {
        (false, false) => {
            compare_digit_runs(a_digits, b_digits).then_with(|| a_suffix.cmp(b_suffix))
        }
        // A numeric segment outranks a purely alphabetic one.
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
        (true, true) => a.cmp(b),
    }
}

fn split_digit_run(segment: &str) -> (&str, &str) {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    segment.split_at(end)
}

/// Numeric comparison of two digit runs without parsing to an integer, so
/// oversized segments cannot overflow.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Extracts the one guaranteed-available version from a fix-version
/// expression, or `None` when the expression cannot name one.
///
/// Plain versions pass through; `[1.0]` pins to `1.0`; a closed interval
/// `[1.0, 2.0]` yields its lower bound (the only release the scanner
/// guarantees exists). Any form with an open parenthesis on either side,
/// like `(,1.0]`, `(1.0,)` or `(1.0, 2.0)`, is exclusive or unbounded
/// below, so no single safe version can be read off it.
pub fn parse_exact_version(range_expr: &str) -> Option<&str> {
    let trimmed = range_expr.trim();
    let stripped = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let stripped = stripped.strip_suffix(']').unwrap_or(stripped);
    let lower = stripped.split(',').next().unwrap_or(stripped).trim();
    if lower.is_empty() || lower.contains('(') || lower.contains(')') {
        return None;
    }
    Some(lower)
}
