//! Finding fingerprinting and snapshot differencing.
//!
//! Identity is deliberately narrow: a dependency finding is identified by
//! (issue id, component name) within its kind, a license violation by
//! (license key, component name), a source-code finding by its file
//! position. Everything else (severity, summary, CVE lists, snippets) is
//! payload and never affects whether a finding counts as new.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::findings::rows::{LicenseRow, VulnerabilityRow};
use crate::findings::{DependencyFinding, LicenseFinding, SnapshotSet, SourceCodeFinding};

pub mod applicability;

/// The four ordered delta lists: what the candidate snapshot introduced
/// over the baseline. Row order is the candidate's own per-kind order;
/// nothing here re-sorts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanDelta {
    pub vulnerabilities: Vec<VulnerabilityRow>,
    pub security_violations: Vec<VulnerabilityRow>,
    pub license_violations: Vec<LicenseRow>,
    pub source_code: Vec<SourceCodeFinding>,
}

impl ScanDelta {
    pub fn len(&self) -> usize {
        self.vulnerabilities.len()
            + self.security_violations.len()
            + self.license_violations.len()
            + self.source_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes the per-kind set difference `candidate - baseline`.
///
/// Dependency-level findings expand to one row per (finding, component)
/// pair before comparison, since two components sharing one finding are
/// independent remediation units. License violations whose key appears in
/// `allowed_licenses` are excluded even when new. Running this twice on
/// identical inputs yields identical ordered output.
pub fn diff(
    baseline: &SnapshotSet,
    candidate: &SnapshotSet,
    allowed_licenses: &[String],
) -> ScanDelta {
    ScanDelta {
        vulnerabilities: new_dependency_rows(baseline.vulnerabilities(), candidate.vulnerabilities()),
        security_violations: new_dependency_rows(
            baseline.security_violations(),
            candidate.security_violations(),
        ),
        license_violations: new_license_rows(
            baseline.license_violations(),
            candidate.license_violations(),
            allowed_licenses,
        ),
        source_code: new_source_code_rows(baseline.source_code(), candidate.source_code()),
    }
}

/// Expands *all* of a snapshot set's findings into rows, as if diffed
/// against an empty baseline. Used when a caller wants to remediate a
/// branch outright instead of comparing two snapshots; expansion order and
/// license filtering match [`diff`] exactly.
pub fn collect_rows(snapshots: &SnapshotSet, allowed_licenses: &[String]) -> ScanDelta {
    diff(&SnapshotSet::default(), snapshots, allowed_licenses)
}

fn new_dependency_rows<'b, 'c>(
    baseline: impl Iterator<Item = &'b DependencyFinding>,
    candidate: impl Iterator<Item = &'c DependencyFinding>,
) -> Vec<VulnerabilityRow> {
    let known: HashSet<(&str, &str)> = baseline
        .flat_map(|finding| {
            finding
                .components
                .iter()
                .map(move |component| (component.name.as_str(), finding.issue_id.as_str()))
        })
        .collect();

    let mut rows = Vec::new();
    for finding in candidate {
        for component in &finding.components {
            if known.contains(&(component.name.as_str(), finding.issue_id.as_str())) {
                continue;
            }
            rows.push(VulnerabilityRow::from_finding(finding, component));
        }
    }
    rows
}

fn new_license_rows<'b, 'c>(
    baseline: impl Iterator<Item = &'b LicenseFinding>,
    candidate: impl Iterator<Item = &'c LicenseFinding>,
    allowed_licenses: &[String],
) -> Vec<LicenseRow> {
    let known: HashSet<(&str, &str)> = baseline
        .flat_map(|finding| {
            finding
                .components
                .iter()
                .map(move |component| (finding.license_key.as_str(), component.name.as_str()))
        })
        .collect();

    let mut rows = Vec::new();
    for finding in candidate {
        if allowed_licenses.iter().any(|key| key == &finding.license_key) {
            debug!("license {} is allow-listed; dropping violation", finding.license_key);
            continue;
        }
        for component in &finding.components {
            if known.contains(&(finding.license_key.as_str(), component.name.as_str())) {
                continue;
            }
            rows.push(LicenseRow::from_finding(finding, component));
        }
    }
    rows
}

fn new_source_code_rows<'b, 'c>(
    baseline: impl Iterator<Item = &'b SourceCodeFinding>,
    candidate: impl Iterator<Item = &'c SourceCodeFinding>,
) -> Vec<SourceCodeFinding> {
    let known: HashSet<(&str, u32, u32)> = baseline
        .map(|finding| (finding.file.as_str(), finding.start_line, finding.start_column))
        .collect();

    candidate
        .filter(|finding| {
            !known.contains(&(finding.file.as_str(), finding.start_line, finding.start_column))
        })
        .cloned()
        .collect()
}
