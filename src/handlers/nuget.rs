//! NuGet fixes.

use std::path::PathBuf;

use crate::error::Result;
use crate::handlers::command::run_tool;
use crate::handlers::require_direct;
use crate::resolver::FixTarget;

/// Bumps a direct NuGet dependency through `dotnet add package`, which
/// rewrites the project file and restores the updated graph.
#[derive(Debug, Clone)]
pub struct NugetHandler {
    working_dir: PathBuf,
}

impl NugetHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        NugetHandler {
            working_dir: working_dir.into(),
        }
    }

    pub fn apply_fix(&self, target: &FixTarget) -> Result<()> {
        require_direct(target)?;
        let args = vec![
            "add".to_string(),
            "package".to_string(),
            target.name.clone(),
            "-v".to_string(),
            target.fixed_version.clone(),
        ];
        run_tool("dotnet", &args, &self.working_dir)?;
        Ok(())
    }
}
