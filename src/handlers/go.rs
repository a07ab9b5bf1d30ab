//! Go module fixes.

use std::path::PathBuf;

use crate::error::Result;
use crate::handlers::command::run_tool;
use crate::resolver::FixTarget;

/// Bumps a Go module through `go get`.
///
/// The module graph lets transitive modules be raised the same way as
/// direct ones, so this handler accepts indirect targets too.
#[derive(Debug, Clone)]
pub struct GoHandler {
    working_dir: PathBuf,
}

impl GoHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        GoHandler {
            working_dir: working_dir.into(),
        }
    }

    pub fn apply_fix(&self, target: &FixTarget) -> Result<()> {
        run_tool("go", &update_args(target), &self.working_dir)?;
        Ok(())
    }
}

/// Go modules tag releases as `vMAJOR.MINOR.PATCH`, while scan results
/// carry the bare version.
fn update_args(target: &FixTarget) -> Vec<String> {
    vec![
        "get".to_string(),
        format!("{}@v{}", target.name, target.fixed_version),
    ]
}
