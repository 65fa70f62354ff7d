//! Shared fixtures for reconciliation scenarios.
//!
//! In-memory collaborators plus small builders for dependencies and feature
//! sets. No real server installation or scanner executable is needed.

use anyhow::{Context, Result};
use fgen_schemas::{DependencyRef, ProjectModel, SCOPE_PROVIDED, TYPE_FEATURE_ARCHIVE};
use std::fs;
use std::path::Path;

pub use fgen_reconcile::FeatureSet;

pub mod fakes;

pub use fakes::{FakeScanner, InMemoryServer, InMemoryWriter, StaticCatalog};

pub fn feature_set(ids: &[&str]) -> FeatureSet {
    ids.iter().map(|s| s.to_string()).collect()
}

/// A provided-scope feature archive (`type = esa`).
pub fn esa(group_id: &str, artifact_id: &str, version: &str) -> DependencyRef {
    DependencyRef::new(group_id, artifact_id, version, SCOPE_PROVIDED, TYPE_FEATURE_ARCHIVE)
}

/// A provided-scope jar.
pub fn provided(group_id: &str, artifact_id: &str, version: &str) -> DependencyRef {
    DependencyRef::new(group_id, artifact_id, version, SCOPE_PROVIDED, "jar")
}

/// A compile-scope jar.
pub fn compile(group_id: &str, artifact_id: &str, version: &str) -> DependencyRef {
    DependencyRef::new(group_id, artifact_id, version, "compile", "jar")
}

pub fn load_project_json(path: &Path) -> Result<ProjectModel> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("read project: {}", path.display()))?;
    let project: ProjectModel = serde_json::from_str(&s).context("parse project json")?;
    Ok(project)
}
