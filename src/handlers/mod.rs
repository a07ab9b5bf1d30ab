//! Per-ecosystem package fix handlers and their dispatch table.

use crate::config::ProjectConfig;
use crate::error::{Error, Result, UnsupportedReason};
use crate::resolver::FixTarget;
use crate::tech::Technology;

mod command;

pub mod go;
pub mod gradle;
pub mod maven;
pub mod npm;
pub mod nuget;
pub mod python;
pub mod yarn;

pub use go::GoHandler;
pub use gradle::GradleHandler;
pub use maven::MavenHandler;
pub use npm::NpmHandler;
pub use nuget::NugetHandler;
pub use python::{PipHandler, PipenvHandler, PoetryHandler};
pub use yarn::YarnHandler;

/// Packages that ship with the build toolchain itself. Bumping these through
/// a manifest rewrite either has no effect or breaks the toolchain, so every
/// handler refuses them up front.
const BUILD_TOOL_DEPENDENCIES: &[(Technology, &[&str])] = &[
    (Technology::Go, &["github.com/golang/go"]),
    (Technology::Pip, &["pip", "setuptools", "wheel"]),
];

/// True when the package is provided by the ecosystem's own toolchain.
pub fn is_build_tool_dependency(technology: Technology, name: &str) -> bool {
    BUILD_TOOL_DEPENDENCIES
        .iter()
        .any(|(tech, packages)| *tech == technology && packages.contains(&name))
}

/// Rejects indirect targets for ecosystems that can only rewrite direct
/// dependency declarations.
pub(crate) fn require_direct(target: &FixTarget) -> Result<()> {
    if target.direct {
        Ok(())
    } else {
        Err(Error::unsupported_fix(
            &target.name,
            &target.fixed_version,
            UnsupportedReason::IndirectDependency,
        ))
    }
}

/// Closed set of fix strategies, one per supported technology.
///
/// A closed enum instead of trait objects keeps dispatch exhaustive: adding a
/// technology without wiring its handler is a compile error, and the
/// `Unsupported` variant gives unknown tags a well-defined failure mode.
#[derive(Debug)]
pub enum PackageHandler {
    Go(GoHandler),
    Maven(MavenHandler),
    Gradle(GradleHandler),
    Npm(NpmHandler),
    Yarn(YarnHandler),
    Nuget(NugetHandler),
    Pip(PipHandler),
    Pipenv(PipenvHandler),
    Poetry(PoetryHandler),
    Unsupported(Technology),
}

impl PackageHandler {
    /// Builds the handler for a technology, rooted at the project's working
    /// directory.
    pub fn for_technology(technology: Technology, project: &ProjectConfig) -> Self {
        let dir = &project.working_dir;
        match technology {
            Technology::Go => PackageHandler::Go(GoHandler::new(dir)),
            Technology::Maven => PackageHandler::Maven(MavenHandler::new(dir)),
            Technology::Gradle => PackageHandler::Gradle(GradleHandler::new(dir)),
            Technology::Npm => PackageHandler::Npm(NpmHandler::new(dir)),
            Technology::Yarn => PackageHandler::Yarn(YarnHandler::new(dir)),
            Technology::Nuget => PackageHandler::Nuget(NugetHandler::new(dir)),
            Technology::Pip => PackageHandler::Pip(PipHandler::new(
                dir,
                project.pip_requirements_file.clone(),
            )),
            Technology::Pipenv => PackageHandler::Pipenv(PipenvHandler::new(dir)),
            Technology::Poetry => PackageHandler::Poetry(PoetryHandler::new(dir)),
            Technology::Unknown => PackageHandler::Unsupported(technology),
        }
    }

    /// The technology this handler serves.
    pub fn technology(&self) -> Technology {
        match self {
            PackageHandler::Go(_) => Technology::Go,
            PackageHandler::Maven(_) => Technology::Maven,
            PackageHandler::Gradle(_) => Technology::Gradle,
            PackageHandler::Npm(_) => Technology::Npm,
            PackageHandler::Yarn(_) => Technology::Yarn,
            PackageHandler::Nuget(_) => Technology::Nuget,
            PackageHandler::Pip(_) => Technology::Pip,
            PackageHandler::Pipenv(_) => Technology::Pipenv,
            PackageHandler::Poetry(_) => Technology::Poetry,
            PackageHandler::Unsupported(tech) => *tech,
        }
    }

    /// Applies a resolved fix to the project's manifests.
    ///
    /// Build-toolchain packages are refused before any handler runs.
    pub fn apply_fix(&mut self, target: &FixTarget) -> Result<()> {
        if is_build_tool_dependency(self.technology(), &target.name) {
            return Err(Error::unsupported_fix(
                &target.name,
                &target.fixed_version,
                UnsupportedReason::BuildToolDependency,
            ));
        }
        match self {
            PackageHandler::Go(handler) => handler.apply_fix(target),
            PackageHandler::Maven(handler) => handler.apply_fix(target),
            PackageHandler::Gradle(handler) => handler.apply_fix(target),
            PackageHandler::Npm(handler) => handler.apply_fix(target),
            PackageHandler::Yarn(handler) => handler.apply_fix(target),
            PackageHandler::Nuget(handler) => handler.apply_fix(target),
            PackageHandler::Pip(handler) => handler.apply_fix(target),
            PackageHandler::Pipenv(handler) => handler.apply_fix(target),
            PackageHandler::Poetry(handler) => handler.apply_fix(target),
            PackageHandler::Unsupported(tech) => Err(Error::unsupported_fix(
                &target.name,
                &target.fixed_version,
                UnsupportedReason::TechnologyNotSupported(*tech),
            )),
        }
    }
}
