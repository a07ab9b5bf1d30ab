//! Contextual-analysis enrichment.
//!
//! A separate applicability pass decides, per CVE, whether the vulnerable
//! code path is actually reachable from the scanned sources and records
//! where it looked. The join here attaches that evidence to delta rows; it
//! is pure annotation and never adds or removes a row.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::findings::rows::VulnerabilityRow;
use crate::findings::{Applicability, ApplicabilityEvidence, ApplicabilityStatus};

/// Evidence from the applicability pass, keyed by CVE id.
///
/// Serializes transparently as a map, so a raw
/// `{"CVE-2023-4321": [{"file": ...}]}` payload loads directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicabilityIndex {
    evidence: HashMap<String, Vec<ApplicabilityEvidence>>,
}

impl ApplicabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cve_id: impl Into<String>, evidence: ApplicabilityEvidence) {
        self.evidence.entry(cve_id.into()).or_default().push(evidence);
    }

    pub fn get(&self, cve_id: &str) -> Option<&[ApplicabilityEvidence]> {
        self.evidence.get(cve_id).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty()
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Annotates each row's matching CVE entries with evidence from `index`
/// and lifts the maximum matched status to the row level. Rows with no
/// matching CVE are left untouched. Re-running the join with the same
/// index is a no-op.
pub fn annotate_applicability(rows: &mut [VulnerabilityRow], index: &ApplicabilityIndex) {
    if index.is_empty() {
        return;
    }
    for row in rows {
        let mut row_status: Option<ApplicabilityStatus> = None;
        for cve in &mut row.cves {
            let Some(evidence) = index.get(&cve.id) else {
                continue;
            };
            let status = evidence
                .iter()
                .map(|e| e.status)
                .max()
                .unwrap_or_default();
            cve.applicability = Some(Applicability {
                status,
                evidence: evidence.to_vec(),
            });
            row_status = row_status.max(Some(status));
        }
        if row_status.is_some() {
            row.applicability = row_status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::CveEntry;

    fn evidence(file: &str, line: u32, column: u32, status: ApplicabilityStatus) -> ApplicabilityEvidence {
        ApplicabilityEvidence {
            file: file.into(),
            start_line: line,
            start_column: column,
            status,
        }
    }

    fn row_with_cves(ids: &[&str]) -> VulnerabilityRow {
        VulnerabilityRow {
            cves: ids
                .iter()
                .map(|id| CveEntry {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_matching_cves_get_evidence_and_others_do_not() {
        let mut index = ApplicabilityIndex::new();
        index.insert(
            "CVE-2023-4321",
            evidence("file1", 1, 10, ApplicabilityStatus::Applicable),
        );

        let mut rows = vec![row_with_cves(&["CVE-2023-4321", "CVE-2023-4444"])];
        annotate_applicability(&mut rows, &index);

        let annotated = rows[0].cves[0].applicability.as_ref().unwrap();
        assert_eq!(annotated.status, ApplicabilityStatus::Applicable);
        assert_eq!(annotated.evidence.len(), 1);
        assert_eq!(annotated.evidence[0].file, "file1");
        assert_eq!(annotated.evidence[0].start_line, 1);
        assert!(rows[0].cves[1].applicability.is_none());
        assert_eq!(rows[0].applicability, Some(ApplicabilityStatus::Applicable));
    }

    #[test]
    fn test_row_status_is_the_maximum_over_matches() {
        let mut index = ApplicabilityIndex::new();
        index.insert(
            "CVE-2023-1111",
            evidence("a.py", 3, 1, ApplicabilityStatus::NotApplicable),
        );
        index.insert(
            "CVE-2023-2222",
            evidence("b.py", 9, 4, ApplicabilityStatus::Applicable),
        );

        let mut rows = vec![row_with_cves(&["CVE-2023-1111", "CVE-2023-2222"])];
        annotate_applicability(&mut rows, &index);
        assert_eq!(rows[0].applicability, Some(ApplicabilityStatus::Applicable));

        let mut only_negative = vec![row_with_cves(&["CVE-2023-1111"])];
        annotate_applicability(&mut only_negative, &index);
        assert_eq!(
            only_negative[0].applicability,
            Some(ApplicabilityStatus::NotApplicable)
        );
    }

    #[test]
    fn test_join_never_changes_row_count_and_is_idempotent() {
        let mut index = ApplicabilityIndex::new();
        index.insert(
            "CVE-2023-4321",
            evidence("file1", 1, 10, ApplicabilityStatus::Undetermined),
        );

        let mut rows = vec![
            row_with_cves(&["CVE-2023-4321"]),
            row_with_cves(&["CVE-2020-0001"]),
        ];
        annotate_applicability(&mut rows, &index);
        assert_eq!(rows.len(), 2);
        let first_pass = rows.clone();

        annotate_applicability(&mut rows, &index);
        assert_eq!(rows, first_pass);
        assert!(rows[1].cves[0].applicability.is_none());
        assert_eq!(rows[1].applicability, None);
    }

    #[test]
    fn test_index_loads_from_raw_json() {
        let index = ApplicabilityIndex::from_json_str(
            r#"{"CVE-2023-4321": [{"file": "file1", "start_line": 1, "start_column": 10, "status": "Applicable"}]}"#,
        )
        .unwrap();
        let evidence = index.get("CVE-2023-4321").unwrap();
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].status, ApplicabilityStatus::Applicable);
    }
}
