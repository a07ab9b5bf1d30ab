//! Maven fixes.
//!
//! The pom tree is parsed only to learn *where* a dependency's version is
//! declared (literal, property, dependency management). The rewrite itself
//! is always delegated to the versions plugin so the build tool stays the
//! single authority over pom edits.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use quick_xml::Reader;
use quick_xml::events::Event;
use walkdir::WalkDir;

use crate::error::{Error, Result, UnsupportedReason};
use crate::handlers::command::run_tool;
use crate::resolver::FixTarget;
use crate::version::compare;

const VERSIONS_PLUGIN: &str = "org.codehaus.mojo:versions-maven-plugin";

/// One `groupId`/`artifactId`/`version` declaration found in a pom, with
/// the section it was declared in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GavCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub in_dependency_management: bool,
}

impl GavCoordinate {
    /// The `groupId:artifactId` form scan results identify packages by.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    fn is_empty(&self) -> bool {
        self.group_id.is_empty() && self.artifact_id.is_empty() && self.version.is_empty()
    }
}

/// Where one dependency's version literally lives: either a literal
/// current version, or the property names it is interpolated from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDependencyDetails {
    pub properties: Vec<String>,
    pub current_version: String,
    pub in_dependency_management: bool,
}

/// Extracts every GAV declaration from one pom document: the project's own
/// coordinate, `<dependency>` entries (including the dependency-management
/// section), and `<plugin>` entries. Declarations are emitted as their
/// elements close, so the enclosing project coordinate comes last.
///
/// The walk is a flat event scan over an element stack, so arbitrarily
/// nested modules, profiles and plugin configurations cost no recursion.
/// `pom_path` is only used to give parse errors a location.
pub fn collect_gav_coordinates(pom_path: &Path, content: &str) -> Result<Vec<GavCoordinate>> {
    let parse_error = |message: String| Error::ManifestParse {
        path: pom_path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    // A frame opens at each element that declares a coordinate; `base` is
    // the stack depth of that element, so its GAV children sit at base + 1.
    struct GavFrame {
        base: usize,
        gav: GavCoordinate,
    }

    let mut stack: Vec<String> = Vec::new();
    let mut frames: Vec<GavFrame> = Vec::new();
    let mut result = Vec::new();

    loop {
        match reader.read_event().map_err(|err| parse_error(err.to_string()))? {
            Event::Start(element) => {
                let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                let parent = stack.last().map(String::as_str);
                let opens_declaration = match name.as_str() {
                    "project" => stack.is_empty(),
                    "dependency" => parent == Some("dependencies"),
                    "plugin" => parent == Some("plugins"),
                    _ => false,
                };
                stack.push(name);
                if opens_declaration {
                    frames.push(GavFrame {
                        base: stack.len(),
                        gav: GavCoordinate {
                            in_dependency_management: stack
                                .iter()
                                .any(|element| element == "dependencyManagement"),
                            ..GavCoordinate::default()
                        },
                    });
                }
            }
            Event::Text(text) => {
                if let Some(frame) = frames.last_mut()
                    && stack.len() == frame.base + 1
                {
                    let value = text
                        .decode()
                        .map_err(|err| parse_error(err.to_string()))?;
                    match stack.last().map(String::as_str) {
                        Some("groupId") => frame.gav.group_id = value.into_owned(),
                        Some("artifactId") => frame.gav.artifact_id = value.into_owned(),
                        Some("version") => frame.gav.version = value.into_owned(),
                        _ => {}
                    }
                }
            }
            Event::End(_) => {
                stack.pop();
                while frames.last().is_some_and(|frame| frame.base > stack.len()) {
                    if let Some(frame) = frames.pop()
                        && !frame.gav.is_empty()
                    {
                        result.push(frame.gav);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(result)
}

/// Folds coordinates into the `groupId:artifactId` lookup map. The first
/// occurrence of a key wins; a `${property}` version additionally records
/// the property name so the rewrite can target the property instead of
/// the (non-existent) literal.
fn fill_dependency_map(
    map: &mut HashMap<String, PomDependencyDetails>,
    coordinates: &[GavCoordinate],
) {
    for coordinate in coordinates {
        if coordinate.version.is_empty() {
            continue;
        }
        let key = coordinate.key();
        if !map.contains_key(&key) {
            map.insert(
                key.clone(),
                PomDependencyDetails {
                    properties: Vec::new(),
                    current_version: coordinate.version.clone(),
                    in_dependency_management: coordinate.in_dependency_management,
                },
            );
        }
        if let Some(property) = coordinate
            .version
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
            && let Some(details) = map.get_mut(&key)
            && !details.properties.iter().any(|existing| existing == property)
        {
            details.properties.push(property.to_string());
            details.current_version = coordinate.version.clone();
            details.in_dependency_management = coordinate.in_dependency_management;
        }
    }
}

/// Goals for bumping a literal version declaration.
fn use_dep_version_goals(target: &FixTarget, in_dependency_management: bool) -> Vec<String> {
    vec![
        "-U".to_string(),
        "-B".to_string(),
        format!("{VERSIONS_PLUGIN}:use-dep-version"),
        format!("-Dincludes={}", target.name),
        format!("-DdepVersion={}", target.fixed_version),
        "-DgenerateBackupPoms=false".to_string(),
        format!("-DprocessDependencies={}", !in_dependency_management),
        format!("-DprocessDependencyManagement={in_dependency_management}"),
    ]
}

/// Goals for rewriting one version property project-wide.
fn set_property_goals(
    property: &str,
    target: &FixTarget,
    in_dependency_management: bool,
) -> Vec<String> {
    vec![
        "-U".to_string(),
        "-B".to_string(),
        format!("{VERSIONS_PLUGIN}:set-property"),
        format!("-Dproperty={property}"),
        format!("-DnewVersion={}", target.fixed_version),
        "-DgenerateBackupPoms=false".to_string(),
        format!("-DprocessDependencies={}", !in_dependency_management),
        format!("-DprocessDependencyManagement={in_dependency_management}"),
    ]
}

/// Bumps Maven dependencies through the versions plugin.
///
/// Direct-ness is decided by the dependency map: a package that appears in
/// no pom of the project cannot be rewritten and is refused as indirect.
#[derive(Debug, Clone)]
pub struct MavenHandler {
    working_dir: PathBuf,
    pom_paths: Vec<PathBuf>,
    dependency_map: Option<HashMap<String, PomDependencyDetails>>,
}

impl MavenHandler {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        MavenHandler {
            working_dir: working_dir.into(),
            pom_paths: Vec::new(),
            dependency_map: None,
        }
    }

    pub fn apply_fix(&mut self, target: &FixTarget) -> Result<()> {
        self.ensure_dependency_map()?;
        let Some(details) = self
            .dependency_map
            .as_ref()
            .and_then(|map| map.get(&target.name))
            .cloned()
        else {
            return Err(Error::unsupported_fix(
                &target.name,
                &target.fixed_version,
                UnsupportedReason::IndirectDependency,
            ));
        };

        if details.properties.is_empty() {
            if compare(&details.current_version, &target.fixed_version) == Ordering::Equal {
                // The declared literal already matches; re-running the
                // versions plugin would be a pointless build.
                return Ok(());
            }
            let goals = use_dep_version_goals(target, details.in_dependency_management);
            run_tool("mvn", &goals, &self.working_dir)?;
        } else {
            for property in &details.properties {
                let goals = set_property_goals(property, target, details.in_dependency_management);
                run_tool("mvn", &goals, &self.working_dir)?;
            }
        }
        Ok(())
    }

    /// Walks the project for pom files (skipping `target` build output) and
    /// parses each into the dependency map, once per handler instance.
    fn ensure_dependency_map(&mut self) -> Result<()> {
        if self.dependency_map.is_some() {
            return Ok(());
        }
        self.discover_poms()?;
        let mut map = HashMap::new();
        for path in self.pom_paths.clone() {
            let content = fs::read_to_string(&path)?;
            let coordinates = collect_gav_coordinates(&path, &content)?;
            fill_dependency_map(&mut map, &coordinates);
        }
        self.dependency_map = Some(map);
        Ok(())
    }

    fn discover_poms(&mut self) -> Result<()> {
        if !self.pom_paths.is_empty() {
            return Ok(());
        }
        let walker = WalkDir::new(&self.working_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != "target");
        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() && entry.file_name() == "pom.xml" {
                paths.push(entry.into_path());
            }
        }
        if paths.is_empty() {
            return Err(Error::ManifestParse {
                path: self.working_dir.clone(),
                message: "no pom.xml files found".to_string(),
            });
        }
        self.pom_paths = paths;
        Ok(())
    }
}
