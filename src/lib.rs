//! Remedi - vulnerability delta and remediation engine
//!
//! This crate takes two dependency-scan snapshots (a baseline and a
//! candidate), computes which findings are newly introduced, resolves the
//! minimal safe fix version for each impacted package, and applies that fix
//! to the project manifest through the ecosystem's own tooling (Maven, Go
//! modules, npm, pip, and friends).

pub mod branch;
pub mod config;
pub mod delta;
pub mod engine;
pub mod error;
pub mod findings;
pub mod handlers;
pub mod resolver;
pub mod tech;
pub mod version;
