//! Gradle fixes.

use std::fs;
use std::io;
use std::path::PathBuf;

use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::error::{Error, Result, UnsupportedReason};
use crate::handlers::require_direct;
use crate::resolver::FixTarget;

/// File names a Gradle build declares dependencies in.
const DESCRIPTOR_NAMES: &[&str] = &["build.gradle", "build.gradle.kts"];

/// Rewrites Gradle build descriptors in place.
///
/// Gradle has no version-bumping CLI comparable to the Maven versions
/// plugin, so the handler edits every `build.gradle`/`build.gradle.kts`
/// under the working directory, covering both the string notation
/// (`"group:artifact:version"`) and the map notation (`group: "...",
/// name: "...", version: "..."`, with `=` in Kotlin scripts).
#[derive(Debug, Clone)]
pub struct GradleHandler {
    working_dir: PathBuf,
    descriptor_paths: Option<Vec<PathBuf>>,
}

impl GradleHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        GradleHandler {
            working_dir: working_dir.into(),
            descriptor_paths: None,
        }
    }

    pub fn apply_fix(&mut self, target: &FixTarget) -> Result<()> {
        require_direct(target)?;
        if !is_version_fixable(&target.current_version) {
            return Err(Error::unsupported_fix(
                &target.name,
                &target.fixed_version,
                UnsupportedReason::VersionNotFixable(target.current_version.clone()),
            ));
        }
        let Some((group, artifact)) = target.name.split_once(':') else {
            // Without a group:artifact coordinate there is nothing to
            // search the descriptors for.
            return Err(Error::unsupported_fix(
                &target.name,
                &target.fixed_version,
                UnsupportedReason::IndirectDependency,
            ));
        };

        let parse_error = |err: regex::Error| Error::ManifestParse {
            path: self.working_dir.clone(),
            message: err.to_string(),
        };
        let current = declaration_patterns(group, artifact, &target.current_version)
            .map_err(parse_error)?;
        let fixed = declaration_patterns(group, artifact, &target.fixed_version)
            .map_err(parse_error)?;

        let bump = |caps: &Captures| {
            format!("{}{}{}", &caps["prefix"], target.fixed_version, &caps["suffix"])
        };

        let mut rewrote = false;
        let mut already_fixed = false;
        for path in self.descriptors()? {
            let content = fs::read_to_string(&path)?;
            let after_string = current.string_notation.replace_all(&content, &bump);
            let updated = current.map_notation.replace_all(&after_string, &bump);
            if updated != content {
                fs::write(&path, updated.as_bytes())?;
                rewrote = true;
            } else if fixed.string_notation.is_match(&content)
                || fixed.map_notation.is_match(&content)
            {
                already_fixed = true;
            }
        }

        if rewrote || already_fixed {
            Ok(())
        } else {
            Err(Error::unsupported_fix(
                &target.name,
                &target.fixed_version,
                UnsupportedReason::IndirectDependency,
            ))
        }
    }

    /// Walks the working directory for build descriptors once per handler
    /// instance and caches the result.
    fn descriptors(&mut self) -> Result<Vec<PathBuf>> {
        if self.descriptor_paths.is_none() {
            let mut paths = Vec::new();
            for entry in WalkDir::new(&self.working_dir).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                if entry.file_type().is_file()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| DESCRIPTOR_NAMES.contains(&name))
                {
                    paths.push(entry.into_path());
                }
            }
            if paths.is_empty() {
                return Err(Error::ManifestParse {
                    path: self.working_dir.clone(),
                    message: "no build.gradle or build.gradle.kts descriptors found".to_string(),
                });
            }
            self.descriptor_paths = Some(paths);
        }
        Ok(self.descriptor_paths.clone().unwrap_or_default())
    }
}

/// The two ways a Gradle descriptor can spell one dependency declaration.
struct DeclarationPatterns {
    string_notation: Regex,
    map_notation: Regex,
}

/// Builds matchers for `"group:artifact:version"` and for the map notation
/// with either `:` (Groovy) or `=` (Kotlin) separators. Only the version is
/// left outside the `prefix`/`suffix` captures so a replacement touches
/// nothing else. Fails only when an oversized coordinate pushes the
/// compiled matcher over the regex size limit.
fn declaration_patterns(
    group: &str,
    artifact: &str,
    version: &str,
) -> std::result::Result<DeclarationPatterns, regex::Error> {
    let group = regex::escape(group);
    let artifact = regex::escape(artifact);
    let version = regex::escape(version);

    let string_notation = Regex::new(&format!(
        r#"(?P<prefix>["']{group}:{artifact}:){version}(?P<suffix>["'])"#
    ))?;
    let map_notation = Regex::new(&format!(
        r#"(?P<prefix>group\s*[:=]\s*["']{group}["']\s*,\s*name\s*[:=]\s*["']{artifact}["']\s*,\s*version\s*[:=]\s*["']){version}(?P<suffix>["'])"#
    ))?;

    Ok(DeclarationPatterns {
        string_notation,
        map_notation,
    })
}

/// A version string can only be rewritten when it is a plain literal.
/// Dynamic versions (`+`, `latest.release`) and range syntax resolve at
/// build time, so there is no single literal to replace.
fn is_version_fixable(version: &str) -> bool {
    let lowered = version.to_lowercase();
    if lowered.contains('+') || lowered.contains("latest.release") {
        return false;
    }
    !((lowered.contains('[') || lowered.contains('(')) && lowered.contains(','))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tech::Technology;

    fn target(name: &str, current: &str, fixed: &str) -> FixTarget {
        FixTarget {
            name: name.to_string(),
            technology: Technology::Gradle,
            current_version: current.to_string(),
            fixed_version: fixed.to_string(),
            direct: true,
            cves: vec!["CVE-2020-36518".to_string()],
        }
    }

    #[test]
    fn test_version_fixable_rejects_dynamic_forms() {
        assert!(is_version_fixable("2.13.4"));
        assert!(is_version_fixable("2.13.4.2"));
        assert!(!is_version_fixable("2.+"));
        assert!(!is_version_fixable("[2.4,3.0)"));
        assert!(!is_version_fixable("(,2.13.4]"));
        assert!(!is_version_fixable("latest.release"));
        assert!(!is_version_fixable("Latest.Release"));
        // A Maven-style pin without a comma is still a single literal.
        assert!(is_version_fixable("[2.13.4]"));
    }

    #[test]
    fn test_string_notation_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            r#"dependencies {
    implementation "com.fasterxml.jackson.core:jackson-databind:2.13.2"
    testImplementation 'junit:junit:4.13.2'
}
"#,
        )
        .unwrap();

        let mut handler = GradleHandler::new(dir.path());
        handler
            .apply_fix(&target(
                "com.fasterxml.jackson.core:jackson-databind",
                "2.13.2",
                "2.13.4.2",
            ))
            .unwrap();

        let content = fs::read_to_string(dir.path().join("build.gradle")).unwrap();
        assert!(content.contains(r#""com.fasterxml.jackson.core:jackson-databind:2.13.4.2""#));
        assert!(content.contains("'junit:junit:4.13.2'"));
    }

    #[test]
    fn test_map_notation_is_rewritten_in_both_dialects() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            "dependencies {\n    implementation group: 'commons-io', name: 'commons-io', version: '2.6'\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("build.gradle.kts"),
            "dependencies {\n    implementation(group = \"commons-io\", name = \"commons-io\", version = \"2.6\")\n}\n",
        )
        .unwrap();

        let mut handler = GradleHandler::new(dir.path());
        handler
            .apply_fix(&target("commons-io:commons-io", "2.6", "2.7"))
            .unwrap();

        let groovy = fs::read_to_string(dir.path().join("build.gradle")).unwrap();
        assert!(groovy.contains("version: '2.7'"));
        let kotlin = fs::read_to_string(dir.path().join("build.gradle.kts")).unwrap();
        assert!(kotlin.contains("version = \"2.7\""));
    }

    #[test]
    fn test_every_module_descriptor_is_updated() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("service");
        fs::create_dir(&module).unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            "implementation \"com.google.guava:guava:30.0-jre\"\n",
        )
        .unwrap();
        fs::write(
            module.join("build.gradle"),
            "implementation \"com.google.guava:guava:30.0-jre\"\n",
        )
        .unwrap();

        let mut handler = GradleHandler::new(dir.path());
        handler
            .apply_fix(&target("com.google.guava:guava", "30.0-jre", "32.0.0-jre"))
            .unwrap();

        for path in [dir.path().join("build.gradle"), module.join("build.gradle")] {
            let content = fs::read_to_string(path).unwrap();
            assert!(content.contains("com.google.guava:guava:32.0.0-jre"));
        }
    }

    #[test]
    fn test_second_run_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            "implementation \"junit:junit:4.13.2\"\n",
        )
        .unwrap();

        let mut handler = GradleHandler::new(dir.path());
        let fix = target("junit:junit", "4.7", "4.13.2");
        handler.apply_fix(&fix).unwrap();
        let content = fs::read_to_string(dir.path().join("build.gradle")).unwrap();
        assert_eq!(content, "implementation \"junit:junit:4.13.2\"\n");
    }

    #[test]
    fn test_dynamic_version_is_not_fixable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            "implementation \"junit:junit:4.+\"\n",
        )
        .unwrap();

        let mut handler = GradleHandler::new(dir.path());
        let err = handler
            .apply_fix(&target("junit:junit", "4.+", "4.13.2"))
            .unwrap_err();
        match err {
            Error::UnsupportedFix { reason, .. } => {
                assert_eq!(
                    reason,
                    UnsupportedReason::VersionNotFixable("4.+".to_string())
                );
            }
            other => panic!("expected UnsupportedFix, got {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_package_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            "implementation \"junit:junit:4.13.2\"\n",
        )
        .unwrap();

        let mut handler = GradleHandler::new(dir.path());
        let err = handler
            .apply_fix(&target("com.google.guava:guava", "30.0-jre", "32.0.0-jre"))
            .unwrap_err();
        match err {
            Error::UnsupportedFix { reason, .. } => {
                assert_eq!(reason, UnsupportedReason::IndirectDependency);
            }
            other => panic!("expected UnsupportedFix, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_coordinate_aborts_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            "implementation \"junit:junit:4.13.2\"\n",
        )
        .unwrap();

        let mut handler = GradleHandler::new(dir.path());
        // Large enough that the compiled matcher exceeds the regex size limit.
        let artifact = "a".repeat(4 * 1024 * 1024);
        let err = handler
            .apply_fix(&target(&format!("junit:{artifact}"), "4.7", "4.13.2"))
            .unwrap_err();
        match &err {
            Error::ManifestParse { .. } => {}
            other => panic!("expected ManifestParse, got {other:?}"),
        }
        assert!(!err.is_recoverable_for_target());
    }

    #[test]
    fn test_missing_descriptors_abort_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mut handler = GradleHandler::new(dir.path());
        let err = handler
            .apply_fix(&target("junit:junit", "4.7", "4.13.2"))
            .unwrap_err();
        assert!(!err.is_recoverable_for_target());
        assert!(err.to_string().contains("build.gradle"));
    }
}
