//! Configuration for delta scanning and fix generation.

use std::path::PathBuf;

use serde::Deserialize;

use crate::findings::Severity;
use crate::tech::Technology;

/// Branch fixes are generated against when none is configured.
const DEFAULT_BASE_BRANCH: &str = "main";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// License keys that never count as new violations
    pub allowed_licenses: Vec<String>,
    /// Fix generation configuration
    pub fix: FixConfig,
    /// Projects to scan and remediate
    pub projects: Vec<ProjectConfig>,
}

/// Fix generation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    /// Branch fix branches are derived from
    pub base_branch: String,
    /// Minimum severity to generate fixes for ("low", "medium", "high",
    /// "critical"; empty means everything)
    pub min_severity: String,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            min_severity: String::new(),
        }
    }
}

impl FixConfig {
    /// Parse the minimum severity string; unknown values degrade to
    /// [`Severity::Unknown`], which filters nothing.
    pub fn min_severity_level(&self) -> Severity {
        Severity::from_str_loose(&self.min_severity)
    }
}

/// One project (working directory) to remediate.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root of the project's checkout
    pub working_dir: PathBuf,
    /// Package ecosystem of the project
    pub technology: Technology,
    /// Descriptor file for pip projects (default "requirements.txt")
    pub pip_requirements_file: Option<String>,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Parse configuration from an embedding host's JSON options.
    pub fn from_json_value(options: Option<serde_json::Value>) -> Self {
        match options {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.allowed_licenses.is_empty());
        assert_eq!(config.fix.base_branch, DEFAULT_BASE_BRANCH);
        assert_eq!(config.fix.min_severity, "");
        assert_eq!(config.fix.min_severity_level(), Severity::Unknown);
        assert!(config.projects.is_empty());
    }

    #[test]
    fn test_parse_from_toml() {
        let config = Config::from_toml_str(
            r#"
allowed_licenses = ["MIT", "Apache-2.0"]

[fix]
base_branch = "dev"
min_severity = "high"

[[projects]]
working_dir = "services/api"
technology = "maven"

[[projects]]
working_dir = "requirements"
technology = "pip"
pip_requirements_file = "requirements-prod.txt"
"#,
        )
        .unwrap();

        assert_eq!(config.allowed_licenses, vec!["MIT", "Apache-2.0"]);
        assert_eq!(config.fix.base_branch, "dev");
        assert_eq!(config.fix.min_severity_level(), Severity::High);
        assert_eq!(config.projects.len(), 2);
        assert_eq!(config.projects[0].working_dir, PathBuf::from("services/api"));
        assert_eq!(config.projects[0].technology, Technology::Maven);
        assert!(config.projects[0].pip_requirements_file.is_none());
        assert_eq!(
            config.projects[1].pip_requirements_file.as_deref(),
            Some("requirements-prod.txt")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
[fix]
base_branch = "release"
"#,
        )
        .unwrap();
        assert_eq!(config.fix.base_branch, "release");
        // Other fields should use defaults
        assert_eq!(config.fix.min_severity_level(), Severity::Unknown);
        assert!(config.allowed_licenses.is_empty());
        assert!(config.projects.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(Config::from_toml_str("allowed_licenses = 3").is_err());
    }

    #[test]
    fn test_parse_from_json() {
        let json = json!({
            "allowed_licenses": ["MIT"],
            "fix": {
                "base_branch": "master",
                "min_severity": "medium"
            },
            "projects": [
                {"working_dir": "backend", "technology": "go"},
                {"working_dir": "frontend", "technology": "npm"}
            ]
        });

        let config = Config::from_json_value(Some(json));
        assert_eq!(config.allowed_licenses, vec!["MIT"]);
        assert_eq!(config.fix.base_branch, "master");
        assert_eq!(config.fix.min_severity_level(), Severity::Medium);
        assert_eq!(config.projects[0].technology, Technology::Go);
        assert_eq!(config.projects[1].technology, Technology::Npm);
    }

    #[test]
    fn test_from_json_value_none() {
        let config = Config::from_json_value(None);
        assert_eq!(config.fix.base_branch, DEFAULT_BASE_BRANCH);
    }

    #[test]
    fn test_from_json_value_invalid_json() {
        let json = json!("invalid");
        let config = Config::from_json_value(Some(json));
        assert_eq!(config.fix.base_branch, DEFAULT_BASE_BRANCH);
    }

    #[test]
    fn test_technology_tag_aliases() {
        let config = Config::from_toml_str(
            r#"
[[projects]]
working_dir = "dotnet-service"
technology = "dotnet"
"#,
        )
        .unwrap();
        assert_eq!(config.projects[0].technology, Technology::Nuget);
    }

    #[test]
    fn test_unknown_technology_degrades() {
        let config = Config::from_toml_str(
            r#"
[[projects]]
working_dir = "exotic"
technology = "conda"
"#,
        )
        .unwrap();
        assert_eq!(config.projects[0].technology, Technology::Unknown);
    }

    #[test]
    fn test_min_severity_level_parsing() {
        for (text, level) in [
            ("low", Severity::Low),
            ("medium", Severity::Medium),
            ("HIGH", Severity::High),
            ("critical", Severity::Critical),
            ("bogus", Severity::Unknown),
            ("", Severity::Unknown),
        ] {
            let config = FixConfig {
                min_severity: text.to_string(),
                ..Default::default()
            };
            assert_eq!(config.min_severity_level(), level);
        }
    }
}
