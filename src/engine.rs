//! Per-project remediation loop.

use hashbrown::HashMap;
use tracing::{info, warn};

use crate::branch::generate_fix_branch_name;
use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::findings::Severity;
use crate::findings::rows::VulnerabilityRow;
use crate::handlers::PackageHandler;
use crate::resolver::{FixTarget, build_fix_targets};
use crate::tech::Technology;

/// One fix that was applied to the working tree, with the branch name the
/// surrounding tooling should push it under.
#[derive(Debug, Clone)]
pub struct AppliedFix {
    pub target: FixTarget,
    pub branch_name: String,
}

/// One fix that could not be applied but did not abort the pass.
#[derive(Debug)]
pub struct SkippedFix {
    pub target: FixTarget,
    pub error: Error,
}

/// Outcome of one remediation pass, in fix-target order.
#[derive(Debug, Default)]
pub struct RemediationReport {
    pub applied: Vec<AppliedFix>,
    pub skipped: Vec<SkippedFix>,
}

impl RemediationReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.skipped.is_empty()
    }
}

/// Drives fix application for one project.
///
/// The engine owns one handler per technology so per-handler discovery
/// caches (Maven pom maps, Gradle descriptor lists) survive across targets
/// within a pass. Engines are per-project: manifest edits must not race on
/// a working directory, so an instance is never shared across projects.
pub struct RemediationEngine {
    project: ProjectConfig,
    base_branch: String,
    min_severity: Severity,
    handlers: HashMap<Technology, PackageHandler>,
}

impl RemediationEngine {
    pub fn new(project: ProjectConfig, base_branch: impl Into<String>) -> Self {
        RemediationEngine {
            project,
            base_branch: base_branch.into(),
            min_severity: Severity::Unknown,
            handlers: HashMap::new(),
        }
    }

    /// Ignore fix targets whose worst row falls below this severity.
    pub fn with_min_severity(mut self, min_severity: Severity) -> Self {
        self.min_severity = min_severity;
        self
    }

    /// Resolves fix targets from expanded rows and applies them in order.
    ///
    /// Per-target failures (unsupported fixes, subprocess failures) are
    /// recorded as skips; parse and I/O failures abort the pass.
    pub fn remediate(&mut self, rows: &[VulnerabilityRow]) -> Result<RemediationReport> {
        let mut report = RemediationReport::default();
        for target in build_fix_targets(rows, self.min_severity) {
            let branch_name =
                generate_fix_branch_name(&self.base_branch, &target.name, &target.fixed_version);
            match self.apply(&target) {
                Ok(()) => {
                    info!(
                        "fixed {} {} -> {} on {branch_name}",
                        target.name, target.current_version, target.fixed_version
                    );
                    report.applied.push(AppliedFix {
                        target,
                        branch_name,
                    });
                }
                Err(error) if error.is_recoverable_for_target() => {
                    warn!("skipping fix for {}: {error}", target.name);
                    report.skipped.push(SkippedFix { target, error });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(report)
    }

    /// Rows tagged with an unknown technology fall back to the project's
    /// configured one; scanners do not always tag every finding.
    fn apply(&mut self, target: &FixTarget) -> Result<()> {
        let technology = if target.technology == Technology::Unknown {
            self.project.technology
        } else {
            target.technology
        };
        let handler = self
            .handlers
            .entry(technology)
            .or_insert_with(|| PackageHandler::for_technology(technology, &self.project));
        handler.apply_fix(target)
    }
}
