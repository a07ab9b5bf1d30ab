//! Ecosystem/technology tags attached to findings and fix targets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A package-management toolchain the engine knows how to talk about.
///
/// The set is closed: scan results tagged with anything else deserialize to
/// [`Technology::Unknown`] and end up at the unsupported-fix fallback
/// instead of failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Go,
    Maven,
    Gradle,
    Npm,
    Yarn,
    /// NuGet and the `dotnet` CLI share one fix strategy.
    #[serde(alias = "dotnet")]
    Nuget,
    Pip,
    Pipenv,
    Poetry,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Technology {
    /// Canonical lowercase tag, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Go => "go",
            Technology::Maven => "maven",
            Technology::Gradle => "gradle",
            Technology::Npm => "npm",
            Technology::Yarn => "yarn",
            Technology::Nuget => "nuget",
            Technology::Pip => "pip",
            Technology::Pipenv => "pipenv",
            Technology::Poetry => "poetry",
            Technology::Unknown => "unknown",
        }
    }

    /// Parse a technology tag case-insensitively, defaulting to
    /// [`Technology::Unknown`] for anything unrecognized.
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "go" | "golang" => Technology::Go,
            "maven" => Technology::Maven,
            "gradle" => Technology::Gradle,
            "npm" => Technology::Npm,
            "yarn" => Technology::Yarn,
            "nuget" | "dotnet" => Technology::Nuget,
            "pip" => Technology::Pip,
            "pipenv" => Technology::Pipenv,
            "poetry" => Technology::Poetry,
            _ => Technology::Unknown,
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
