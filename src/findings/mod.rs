//! Shared data model for scan findings and snapshots.
//!
//! A scan snapshot is what the external scanning service hands the engine:
//! four ordered lists of raw findings (dependency vulnerabilities, security
//! violations, license violations, and source-code findings). Everything
//! here is plain data with `serde` derives; lenient defaults keep a partial
//! or over-sized scanner payload from failing the whole snapshot.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub mod rows;

/// Severity of a finding, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum Severity {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric rank for comparisons (higher = more severe).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Unknown => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    /// Check if this severity meets or exceeds a minimum threshold.
    pub fn meets_threshold(&self, min: Severity) -> bool {
        self.rank() >= min.rank()
    }

    /// Parse a severity from a string (case-insensitive); anything
    /// unrecognized maps to [`Severity::Unknown`].
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Deserialization is hand-written so unrecognized tags can fall back to
// `Unknown`, which must stay the first variant for the derived `Ord` to
// rank it lowest.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Severity::from_str_loose(&raw))
    }
}

/// Outcome of the contextual-analysis pass for one CVE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum ApplicabilityStatus {
    NotApplicable,
    #[default]
    Undetermined,
    Applicable,
}

impl ApplicabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicabilityStatus::NotApplicable => "not applicable",
            ApplicabilityStatus::Undetermined => "undetermined",
            ApplicabilityStatus::Applicable => "applicable",
        }
    }
}

impl fmt::Display for ApplicabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// `Undetermined` sits mid-enum so the evidence join can take a maximum;
// any tag other than the two decided ones deserializes to it.
impl<'de> Deserialize<'de> for ApplicabilityStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "NotApplicable" => ApplicabilityStatus::NotApplicable,
            "Applicable" => ApplicabilityStatus::Applicable,
            _ => ApplicabilityStatus::Undetermined,
        })
    }
}

/// One piece of evidence from the applicability pass: where in the scanned
/// sources a CVE's vulnerable pattern was (or was not) found.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicabilityEvidence {
    pub file: String,
    pub start_line: u32,
    pub start_column: u32,
    pub status: ApplicabilityStatus,
}

/// Applicability annotation attached to a CVE entry after enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Applicability {
    pub status: ApplicabilityStatus,
    pub evidence: Vec<ApplicabilityEvidence>,
}

/// One CVE reference carried by a finding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CveEntry {
    pub id: String,
    pub cvss_v3_score: Option<String>,
    /// Filled in by the enrichment join; absent on raw scanner output.
    pub applicability: Option<Applicability>,
}

/// A (name, version) pair identifying one node of an impact path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinate {
    pub name: String,
    pub version: String,
}

/// One component a finding impacts, with the candidate fix versions the
/// scanner asserts for it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactedComponent {
    pub name: String,
    pub version: String,
    pub fixed_versions: Vec<String>,
    /// Dependency chain from the project's first-level dependency down to
    /// this component. Length 1 means the component is a direct dependency.
    pub impact_path: Vec<Coordinate>,
}

impl ImpactedComponent {
    /// Whether this component is declared directly in the project manifest.
    /// An empty impact path is treated as indirect rather than an error.
    pub fn is_direct(&self) -> bool {
        self.impact_path.len() == 1
    }
}

/// A dependency-level finding: either a vulnerability or a security
/// violation, depending on which snapshot list carries it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyFinding {
    /// Scanner issue id (e.g. "XRAY-123"); may be empty for CVE-only rows.
    pub issue_id: String,
    pub summary: String,
    pub severity: Severity,
    pub technology: crate::tech::Technology,
    pub cves: Vec<CveEntry>,
    pub components: Vec<ImpactedComponent>,
}

/// A license-policy violation attached to one or more components.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseFinding {
    /// License key as reported by the scanner (e.g. "GPL-3.0").
    pub license_key: String,
    pub severity: Severity,
    pub components: Vec<ImpactedComponent>,
}

/// A source-code finding: an exposed secret or an IaC misconfiguration.
/// Identity is the file position; the message and snippet are payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCodeFinding {
    pub severity: Severity,
    /// Human-readable description of what was found.
    pub finding: String,
    pub file: String,
    pub start_line: u32,
    pub start_column: u32,
    pub snippet: String,
}

/// Everything one scan of one project state produced, in scanner order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSnapshot {
    pub vulnerabilities: Vec<DependencyFinding>,
    pub security_violations: Vec<DependencyFinding>,
    pub license_violations: Vec<LicenseFinding>,
    /// Secrets and IaC findings share one list; they share one identity
    /// rule and one delta list downstream.
    pub source_code: Vec<SourceCodeFinding>,
}

impl ScanSnapshot {
    pub fn is_empty(&self) -> bool {
        self.vulnerabilities.is_empty()
            && self.security_violations.is_empty()
            && self.license_violations.is_empty()
            && self.source_code.is_empty()
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// A set of snapshots for one project state. Projects with several
/// independent build roots get one [`ScanSnapshot`] per scanned
/// sub-directory; iteration preserves part order, so consumers see the same
/// ordering an up-front merge would produce.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSet {
    pub results: Vec<ScanSnapshot>,
}

impl SnapshotSet {
    /// Wraps the single-build-root common case.
    pub fn single(result: ScanSnapshot) -> Self {
        SnapshotSet {
            results: vec![result],
        }
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn vulnerabilities(&self) -> impl Iterator<Item = &DependencyFinding> {
        self.results.iter().flat_map(|r| r.vulnerabilities.iter())
    }

    pub fn security_violations(&self) -> impl Iterator<Item = &DependencyFinding> {
        self.results.iter().flat_map(|r| r.security_violations.iter())
    }

    pub fn license_violations(&self) -> impl Iterator<Item = &LicenseFinding> {
        self.results.iter().flat_map(|r| r.license_violations.iter())
    }

    pub fn source_code(&self) -> impl Iterator<Item = &SourceCodeFinding> {
        self.results.iter().flat_map(|r| r.source_code.iter())
    }
}

impl From<ScanSnapshot> for SnapshotSet {
    fn from(result: ScanSnapshot) -> Self {
        SnapshotSet::single(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Unknown < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert!(Severity::Critical.meets_threshold(Severity::High));
        assert!(!Severity::Low.meets_threshold(Severity::Medium));
        assert!(Severity::Unknown.meets_threshold(Severity::Unknown));
    }

    #[test]
    fn test_severity_loose_parsing() {
        assert_eq!(Severity::from_str_loose("Critical"), Severity::Critical);
        assert_eq!(Severity::from_str_loose("HIGH"), Severity::High);
        assert_eq!(Severity::from_str_loose(" medium "), Severity::Medium);
        assert_eq!(Severity::from_str_loose("informational"), Severity::Unknown);
        assert_eq!(Severity::from_str_loose(""), Severity::Unknown);
    }

    #[test]
    fn test_severity_serde_tolerates_unknown_strings() {
        let sev: Severity = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(sev, Severity::High);
        let sev: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(sev, Severity::Critical);
        let sev: Severity = serde_json::from_str("\"Negligible\"").unwrap();
        assert_eq!(sev, Severity::Unknown);
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"High\"");
    }

    #[test]
    fn test_applicability_status_ordering() {
        assert!(ApplicabilityStatus::NotApplicable < ApplicabilityStatus::Undetermined);
        assert!(ApplicabilityStatus::Undetermined < ApplicabilityStatus::Applicable);
    }

    #[test]
    fn test_applicability_status_serde_falls_back_to_undetermined() {
        let status: ApplicabilityStatus = serde_json::from_str("\"Applicable\"").unwrap();
        assert_eq!(status, ApplicabilityStatus::Applicable);
        let status: ApplicabilityStatus = serde_json::from_str("\"NotApplicable\"").unwrap();
        assert_eq!(status, ApplicabilityStatus::NotApplicable);
        let status: ApplicabilityStatus = serde_json::from_str("\"NotCovered\"").unwrap();
        assert_eq!(status, ApplicabilityStatus::Undetermined);
        assert_eq!(
            serde_json::to_string(&ApplicabilityStatus::NotApplicable).unwrap(),
            "\"NotApplicable\""
        );
    }

    #[test]
    fn test_direct_dependency_from_impact_path() {
        let mut component = ImpactedComponent {
            name: "minimist".into(),
            version: "1.2.5".into(),
            fixed_versions: vec!["1.2.6".into()],
            impact_path: vec![Coordinate {
                name: "minimist".into(),
                version: "1.2.5".into(),
            }],
        };
        assert!(component.is_direct());

        component.impact_path.insert(
            0,
            Coordinate {
                name: "mkdirp".into(),
                version: "0.5.1".into(),
            },
        );
        assert!(!component.is_direct());

        component.impact_path.clear();
        assert!(!component.is_direct());
    }

    #[test]
    fn test_snapshot_parses_partial_payload() {
        let snapshot = ScanSnapshot::from_json_str(
            r#"{
                "vulnerabilities": [
                    {
                        "issue_id": "XRAY-122345",
                        "severity": "High",
                        "technology": "npm",
                        "components": [
                            {"name": "minimist", "version": "1.2.5", "fixed_versions": ["[1.2.6]"]}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.vulnerabilities.len(), 1);
        let finding = &snapshot.vulnerabilities[0];
        assert_eq!(finding.issue_id, "XRAY-122345");
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.technology, crate::tech::Technology::Npm);
        assert!(finding.summary.is_empty());
        assert!(finding.cves.is_empty());
        assert!(snapshot.security_violations.is_empty());
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_snapshot_set_iterates_parts_in_order() {
        let part1 = ScanSnapshot {
            vulnerabilities: vec![DependencyFinding {
                issue_id: "XRAY-1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let part2 = ScanSnapshot {
            vulnerabilities: vec![DependencyFinding {
                issue_id: "XRAY-2".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let set = SnapshotSet {
            results: vec![part1, part2],
        };
        let ids: Vec<&str> = set.vulnerabilities().map(|v| v.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["XRAY-1", "XRAY-2"]);
    }
}
