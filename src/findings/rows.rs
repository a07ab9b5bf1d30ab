//! Expanded per-component rows.
//!
//! A dependency-level finding may impact several components at once; each
//! (finding, component) pair is an independent remediation unit, so the
//! differ flattens findings into one row per pair before comparing or
//! reporting anything.

use serde::{Deserialize, Serialize};

use super::{ApplicabilityStatus, CveEntry, DependencyFinding, ImpactedComponent, LicenseFinding, Severity};
use crate::tech::Technology;

/// One (vulnerability-or-violation, component) pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityRow {
    pub issue_id: String,
    pub summary: String,
    pub severity: Severity,
    pub technology: Technology,
    pub cves: Vec<CveEntry>,
    /// Row-level applicability verdict, the maximum status over the row's
    /// annotated CVEs. `None` until the enrichment join runs (or when no
    /// CVE matched).
    pub applicability: Option<ApplicabilityStatus>,
    pub component: ImpactedComponent,
}

impl VulnerabilityRow {
    /// Flattens one impacted component of a finding into a row, cloning the
    /// finding-level payload alongside it.
    pub fn from_finding(finding: &DependencyFinding, component: &ImpactedComponent) -> Self {
        VulnerabilityRow {
            issue_id: finding.issue_id.clone(),
            summary: finding.summary.clone(),
            severity: finding.severity,
            technology: finding.technology,
            cves: finding.cves.clone(),
            applicability: None,
            component: component.clone(),
        }
    }
}

/// One (license-violation, component) pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseRow {
    pub license_key: String,
    pub severity: Severity,
    pub component: ImpactedComponent,
}

impl LicenseRow {
    pub fn from_finding(finding: &LicenseFinding, component: &ImpactedComponent) -> Self {
        LicenseRow {
            license_key: finding.license_key.clone(),
            severity: finding.severity,
            component: component.clone(),
        }
    }
}
