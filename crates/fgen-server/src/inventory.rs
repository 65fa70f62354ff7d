//! Features already declared for a server, read from its XML configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use fgen_reconcile::{FeatureInventory, FeatureSet, InventoryError};

use crate::writer::{GENERATED_FEATURES_FILE, OVERRIDES_DIR};
use crate::xml_text::read_xml;

/// Dropin directories read after `server.xml`, in this order.
pub const DROPIN_DIRS: &[&str] = &["configDropins/defaults", "configDropins/overrides"];

/// Matches `<feature>` element values, ignoring commented-out markup.
#[derive(Debug, Clone)]
pub struct FeaturePattern {
    comment: Regex,
    feature: Regex,
}

impl FeaturePattern {
    pub fn new() -> Result<Self> {
        Ok(Self {
            comment: Regex::new(r"(?s)<!--.*?-->").context("comment pattern")?,
            feature: Regex::new(r"(?s)<feature>\s*([^<]*?)\s*</feature>")
                .context("feature pattern")?,
        })
    }

    /// `<feature>` values of one XML document, case kept.
    pub fn features_in(&self, xml: &str) -> Vec<String> {
        let stripped = self.comment.replace_all(xml, "");
        self.feature
            .captures_iter(&stripped)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|f| !f.is_empty())
            .collect()
    }
}

/// Reads `server.xml` and the dropin directories of a server directory.
#[derive(Debug, Clone)]
pub struct ServerXmlInventory {
    server_dir: PathBuf,
    pattern: FeaturePattern,
    skip_generated: bool,
}

impl ServerXmlInventory {
    pub fn new(server_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            server_dir: server_dir.into(),
            pattern: FeaturePattern::new()?,
            skip_generated: false,
        })
    }

    /// Leave out the generated override file, i.e. read the server the way
    /// a generation run sees it after retracting its previous output.
    pub fn excluding_generated(mut self) -> Self {
        self.skip_generated = true;
        self
    }

    fn generated_file(&self) -> PathBuf {
        self.server_dir.join(OVERRIDES_DIR).join(GENERATED_FEATURES_FILE)
    }

    pub fn server_dir(&self) -> &Path {
        &self.server_dir
    }

    /// Files that contribute declarations, in read order. Missing ones are skipped.
    pub fn config_files(&self) -> Result<Vec<PathBuf>, InventoryError> {
        let mut files = Vec::new();
        let server_xml = self.server_dir.join("server.xml");
        if server_xml.is_file() {
            files.push(server_xml);
        }
        for dir in DROPIN_DIRS {
            files.extend(xml_files_in(&self.server_dir.join(dir))?);
        }
        if self.skip_generated {
            let generated = self.generated_file();
            files.retain(|f| *f != generated);
        }
        Ok(files)
    }
}

fn xml_files_in(dir: &Path) -> Result<Vec<PathBuf>, InventoryError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|cause| InventoryError {
        source_path: dir.to_path_buf(),
        cause,
    })?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|cause| InventoryError {
            source_path: dir.to_path_buf(),
            cause,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "xml") {
            out.push(path);
        }
    }
    // Dropins apply in alphabetical order.
    out.sort();
    Ok(out)
}

impl FeatureInventory for ServerXmlInventory {
    fn installed_features(&self) -> Result<FeatureSet, InventoryError> {
        let mut features = FeatureSet::new();
        for path in self.config_files()? {
            let doc = read_xml(&path).map_err(|cause| InventoryError {
                source_path: path.clone(),
                cause,
            })?;
            let found = self.pattern.features_in(&doc.text);
            debug!(file = %path.display(), features = ?found, "declared features");
            features.extend(found);
        }
        Ok(features)
    }
}
