//! Yarn fixes.

use std::path::PathBuf;

use crate::error::Result;
use crate::handlers::command::run_tool;
use crate::handlers::require_direct;
use crate::resolver::FixTarget;

/// Bumps a direct Yarn dependency through `yarn up`.
#[derive(Debug, Clone)]
pub struct YarnHandler {
    working_dir: PathBuf,
}

impl YarnHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        YarnHandler {
            working_dir: working_dir.into(),
        }
    }

    pub fn apply_fix(&self, target: &FixTarget) -> Result<()> {
        require_direct(target)?;
        let args = vec![
            "up".to_string(),
            format!("{}@{}", target.name, target.fixed_version),
        ];
        run_tool("yarn", &args, &self.working_dir)?;
        Ok(())
    }
}
