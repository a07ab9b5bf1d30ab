//! npm fixes.

use std::path::PathBuf;

use crate::error::Result;
use crate::handlers::command::run_tool;
use crate::handlers::require_direct;
use crate::resolver::FixTarget;

/// Bumps a direct npm dependency through `npm install`, which rewrites
/// both `package.json` and the lockfile.
#[derive(Debug, Clone)]
pub struct NpmHandler {
    working_dir: PathBuf,
}

impl NpmHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        NpmHandler {
            working_dir: working_dir.into(),
        }
    }

    pub fn apply_fix(&self, target: &FixTarget) -> Result<()> {
        require_direct(target)?;
        let args = vec![
            "install".to_string(),
            format!("{}@{}", target.name, target.fixed_version),
        ];
        run_tool("npm", &args, &self.working_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, UnsupportedReason};
    use crate::tech::Technology;

    fn target(direct: bool) -> FixTarget {
        FixTarget {
            name: "minimist".to_string(),
            technology: Technology::Npm,
            current_version: "1.2.5".to_string(),
            fixed_version: "1.2.6".to_string(),
            direct,
            cves: vec!["CVE-2021-44906".to_string()],
        }
    }

    #[test]
    fn test_indirect_dependency_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let handler = NpmHandler::new(dir.path());
        let err = handler.apply_fix(&target(false)).unwrap_err();
        match err {
            Error::UnsupportedFix { reason, .. } => {
                assert_eq!(reason, UnsupportedReason::IndirectDependency);
            }
            other => panic!("expected UnsupportedFix, got {other:?}"),
        }
    }
}
