//! Python ecosystem fixes: pip, Pipenv and Poetry.

use std::fs;
use std::path::PathBuf;

use regex::Regex;

use crate::error::{Error, Result, UnsupportedReason};
use crate::handlers::command::run_tool;
use crate::handlers::require_direct;
use crate::resolver::FixTarget;

/// The file a pip project declares its dependencies in when none is
/// configured.
const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

/// Version operators a requirements line may pin a dependency with.
const VERSION_OPERATORS: &str = "(==|>=|<=|~=|>|<)";

/// Rewrites a pip requirements descriptor in place.
///
/// pip has no authoritative manifest-editing tool, so this is the one
/// handler that edits text directly: the first `name<op>version` occurrence
/// is replaced with a lower-cased `name==fixed` pin. Requirement names are
/// matched case-insensitively, the way pip resolves them.
#[derive(Debug, Clone)]
pub struct PipHandler {
    working_dir: PathBuf,
    requirements_file: String,
}

impl PipHandler {
    pub fn new(working_dir: impl Into<PathBuf>, requirements_file: Option<String>) -> Self {
        PipHandler {
            working_dir: working_dir.into(),
            requirements_file: requirements_file
                .unwrap_or_else(|| DEFAULT_REQUIREMENTS_FILE.to_string()),
        }
    }

    pub fn apply_fix(&self, target: &FixTarget) -> Result<()> {
        require_direct(target)?;

        let path = self.working_dir.join(&self.requirements_file);
        let content = fs::read_to_string(&path)?;
        let fixed = fixed_requirement(target);

        let pattern = format!(
            "(?i){}\\s*{VERSION_OPERATORS}\\s*{}",
            regex::escape(&target.name),
            regex::escape(&target.current_version),
        );
        // Escaped fragments cannot produce an invalid pattern; only a
        // pathological requirement name can push the compiled matcher over
        // the regex size limit.
        let matcher = Regex::new(&pattern).map_err(|err| Error::ManifestParse {
            path: path.clone(),
            message: err.to_string(),
        })?;

        if matcher.is_match(&content) {
            let updated = matcher.replace(&content, regex::NoExpand(&fixed));
            if updated != content {
                fs::write(&path, updated.as_bytes())?;
            }
            return Ok(());
        }
        if content.to_lowercase().contains(&fixed) {
            // Already pinned to the fix version; leave the file untouched.
            return Ok(());
        }
        Err(Error::unsupported_fix(
            &target.name,
            &target.fixed_version,
            UnsupportedReason::IndirectDependency,
        ))
    }
}

/// The replacement requirement line fragment, normalized to lower case.
fn fixed_requirement(target: &FixTarget) -> String {
    format!("{}=={}", target.name, target.fixed_version).to_lowercase()
}

/// Bumps a direct Pipenv dependency through `pipenv install`, which
/// rewrites both the Pipfile and its lock.
#[derive(Debug, Clone)]
pub struct PipenvHandler {
    working_dir: PathBuf,
}

impl PipenvHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        PipenvHandler {
            working_dir: working_dir.into(),
        }
    }

    pub fn apply_fix(&self, target: &FixTarget) -> Result<()> {
        require_direct(target)?;
        run_tool("pipenv", &pinned_install_args("install", target), &self.working_dir)?;
        Ok(())
    }
}

/// Bumps a direct Poetry dependency through `poetry add`, then refreshes
/// the lock file for just that package.
#[derive(Debug, Clone)]
pub struct PoetryHandler {
    working_dir: PathBuf,
}

impl PoetryHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        PoetryHandler {
            working_dir: working_dir.into(),
        }
    }

    pub fn apply_fix(&self, target: &FixTarget) -> Result<()> {
        require_direct(target)?;
        run_tool("poetry", &pinned_install_args("add", target), &self.working_dir)?;
        let update = vec!["update".to_string(), target.name.clone()];
        run_tool("poetry", &update, &self.working_dir)?;
        Ok(())
    }
}

fn pinned_install_args(subcommand: &str, target: &FixTarget) -> Vec<String> {
    vec![
        subcommand.to_string(),
        format!("{}=={}", target.name, target.fixed_version),
    ]
}
