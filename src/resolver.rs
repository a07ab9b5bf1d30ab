//! Fix-version resolution and fix-target construction.
//!
//! The resolver answers one question per impacted component: of all the fix
//! versions the scanner suggested, which is the smallest one that is
//! actually an upgrade? Components that share a name across several
//! findings are merged into a single fix target first, so one branch fixes
//! every finding the bump resolves.

use std::cmp::Ordering;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::findings::Severity;
use crate::findings::rows::VulnerabilityRow;
use crate::tech::Technology;
use crate::version::{compare, parse_exact_version};

/// Picks the minimal candidate fix version strictly greater than
/// `current_version`, or `None` when no candidate qualifies.
///
/// Candidates pass through [`parse_exact_version`] first, so range
/// expressions resolve to their guaranteed lower bound and open ranges are
/// skipped. Exact-string duplicates are filtered; among candidates that
/// compare equal, the first in input order wins.
///
/// Policy note: when `current_version` is unparsable (a branch name, a
/// commit hash), every numeric candidate compares greater than it, so such
/// components still receive *a* fix (the smallest candidate) rather than
/// none. That choice is a heuristic: under an ecosystem's real ordering
/// rules the picked candidate is not guaranteed to be newer than whatever
/// the unparsable string denotes.
pub fn minimal_fix<I>(current_version: &str, candidates: I) -> Option<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let trimmed = current_version.trim();
    let current = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let mut seen: HashSet<String> = HashSet::new();
    let mut best: Option<String> = None;
    for raw in candidates {
        let raw = raw.as_ref();
        let Some(version) = parse_exact_version(raw) else {
            debug!("skipping fix candidate '{raw}': no resolvable lower bound");
            continue;
        };
        if !seen.insert(version.to_string()) {
            continue;
        }
        if compare(version, current) != Ordering::Greater {
            continue;
        }
        match &best {
            Some(b) if compare(version, b) != Ordering::Less => {}
            _ => best = Some(version.to_string()),
        }
    }
    best
}

/// One resolved, applicable fix: bump `name` from `current_version` to
/// `fixed_version` in a project of the given technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixTarget {
    pub name: String,
    pub technology: Technology,
    pub current_version: String,
    pub fixed_version: String,
    /// Whether the package is declared directly in the project manifest.
    pub direct: bool,
    /// CVE ids this bump resolves, in first-seen order.
    pub cves: Vec<String>,
}

struct PendingTarget<'a> {
    technology: Technology,
    direct: bool,
    current_version: &'a str,
    candidates: Vec<&'a str>,
    cves: Vec<&'a str>,
}

/// Merges expanded vulnerability rows into per-component fix targets.
///
/// Rows below `min_severity` are ignored. Rows sharing a component name
/// merge: candidate fix versions union up (first-seen order, exact-string
/// dedup), the last-seen installed version wins, directness and technology
/// come from the component's first row, and CVE ids union up. The resolver
/// then runs once per component over the union; components it cannot
/// resolve are dropped silently, since "no fix available" is not an error.
/// Components surface in first-occurrence order.
pub fn build_fix_targets(rows: &[VulnerabilityRow], min_severity: Severity) -> Vec<FixTarget> {
    let mut order: Vec<&str> = Vec::new();
    let mut pending: HashMap<&str, PendingTarget<'_>> = HashMap::new();

    for row in rows {
        if !row.severity.meets_threshold(min_severity) {
            debug!(
                "skipping {}: severity {} below floor {min_severity}",
                row.component.name, row.severity
            );
            continue;
        }
        let component = &row.component;
        if component.name.is_empty() {
            debug!("skipping row with unnamed component (issue '{}')", row.issue_id);
            continue;
        }
        let entry = pending
            .entry(component.name.as_str())
            .or_insert_with(|| {
                order.push(component.name.as_str());
                PendingTarget {
                    technology: row.technology,
                    direct: component.is_direct(),
                    current_version: component.version.as_str(),
                    candidates: Vec::new(),
                    cves: Vec::new(),
                }
            });
        entry.current_version = component.version.as_str();
        for candidate in &component.fixed_versions {
            if !entry.candidates.contains(&candidate.as_str()) {
                entry.candidates.push(candidate.as_str());
            }
        }
        for cve in &row.cves {
            if !cve.id.is_empty() && !entry.cves.contains(&cve.id.as_str()) {
                entry.cves.push(cve.id.as_str());
            }
        }
    }

    let mut targets = Vec::new();
    for name in order {
        let entry = &pending[name];
        let Some(fixed_version) = minimal_fix(entry.current_version, &entry.candidates) else {
            debug!(
                "no candidate exceeds {} for {name}; leaving unfixed",
                entry.current_version
            );
            continue;
        };
        targets.push(FixTarget {
            name: name.to_string(),
            technology: entry.technology,
            current_version: entry.current_version.to_string(),
            fixed_version,
            direct: entry.direct,
            cves: entry.cves.iter().map(|c| c.to_string()).collect(),
        });
    }
    targets
}
