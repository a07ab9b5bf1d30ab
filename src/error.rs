//! Error types for the remediation engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::tech::Technology;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an otherwise-resolved fix cannot be applied automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The package is not a direct dependency declaration the ecosystem can
    /// rewrite (transitive, or simply absent from the descriptors).
    #[error("indirect dependency fixes are not supported for this ecosystem")]
    IndirectDependency,
    /// No concrete handler exists for the technology tag.
    #[error("technology {0} has no automated fix support")]
    TechnologyNotSupported(Technology),
    /// The package is part of the build toolchain itself, not a project
    /// dependency worth rewriting.
    #[error("package is provided by the build toolchain")]
    BuildToolDependency,
    /// The declared version is not a fixable literal (range syntax or
    /// dynamic versions).
    #[error("declared version '{0}' is not a fixable literal")]
    VersionNotFixable(String),
}

/// All failures surfaced by the engine.
///
/// Unsupported fixes and subprocess failures are terminal for a single fix
/// target; manifest parse and I/O failures abort the whole project pass.
#[derive(Error, Debug)]
pub enum Error {
    /// A fix was resolved but no handler can apply it safely.
    #[error("cannot fix {package} to version {fixed_version}: {reason}")]
    UnsupportedFix {
        package: String,
        fixed_version: String,
        reason: UnsupportedReason,
    },

    /// A manifest file exists but could not be parsed.
    #[error("failed to parse manifest {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// An ecosystem build tool could not be spawned or exited non-zero.
    /// Carries the literal command line and the combined stdout/stderr.
    #[error("command `{command}` failed: {message}\n{output}")]
    CommandFailed {
        command: String,
        message: String,
        output: String,
    },

    /// Filesystem access failed during manifest discovery or rewrite.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds an [`Error::UnsupportedFix`] without struct-literal noise at
    /// call sites.
    pub fn unsupported_fix(
        package: impl Into<String>,
        fixed_version: impl Into<String>,
        reason: UnsupportedReason,
    ) -> Self {
        Error::UnsupportedFix {
            package: package.into(),
            fixed_version: fixed_version.into(),
            reason,
        }
    }

    /// True when the failure is scoped to one fix target and the caller may
    /// continue with the remaining targets.
    pub fn is_recoverable_for_target(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFix { .. } | Error::CommandFailed { .. }
        )
    }

    /// True for the distinguished unsupported-fix error.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedFix { .. })
    }
}
