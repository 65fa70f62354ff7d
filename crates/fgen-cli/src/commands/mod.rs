//! Command handler modules for fgen.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod generate;

use anyhow::{Context, Result};
use fgen_reconcile::FeatureSet;
use fgen_schemas::ProjectModel;
use std::fs;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `RUST_LOG` wins; otherwise `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load a project descriptor. A UTF-8 BOM is tolerated.
pub fn load_project(path: &str) -> Result<ProjectModel> {
    let bytes = fs::read(path).with_context(|| format!("read project failed: {}", path))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let model: ProjectModel =
        serde_json::from_slice(bytes).context("project must contain valid JSON")?;
    Ok(model)
}

/// Output directories of the project that exist, own first. Relative entries
/// resolve against `base`. Canonical where possible, absolute otherwise.
pub fn existing_classes_dirs(model: &ProjectModel, base: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for dir in model.candidate_output_directories() {
        let p = Path::new(dir);
        let p = if p.is_absolute() {
            p.to_path_buf()
        } else {
            base.join(p)
        };
        if !p.is_dir() {
            tracing::debug!(dir = %p.display(), "skipping missing classes directory");
            continue;
        }
        let p = fs::canonicalize(&p).unwrap_or(p);
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

/// Directory relative project paths are resolved against.
pub fn project_base(project_path: &str) -> Result<PathBuf> {
    let parent = Path::new(project_path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    if parent.is_absolute() {
        return Ok(parent);
    }
    let cwd = std::env::current_dir().context("current directory unavailable")?;
    Ok(cwd.join(parent))
}

pub fn join(features: &FeatureSet) -> String {
    features.iter().cloned().collect::<Vec<_>>().join(",")
}
