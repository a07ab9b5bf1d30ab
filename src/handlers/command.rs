//! Subprocess plumbing shared by the package handlers.
//!
//! Ecosystems with an authoritative rewrite tool are mutated only through
//! that tool; this module is the single place a child process is spawned.
//! Calls block with no timeout and are never retried; a failed invocation
//! is terminal for its fix target.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Runs a build tool in `working_dir` and returns its combined
/// stdout/stderr. A spawn failure or non-zero exit becomes
/// [`Error::CommandFailed`] carrying the literal command line attempted.
pub(crate) fn run_tool(program: &str, args: &[String], working_dir: &Path) -> Result<String> {
    let command_line = render_command_line(program, args);
    debug!("running `{command_line}` in {}", working_dir.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .output()
        .map_err(|err| Error::CommandFailed {
            command: command_line.clone(),
            message: err.to_string(),
            output: String::new(),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&stderr);
    }

    if !output.status.success() {
        let message = match output.status.code() {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        return Err(Error::CommandFailed {
            command: command_line,
            message,
            output: combined,
        });
    }
    Ok(combined)
}

fn render_command_line(program: &str, args: &[String]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
