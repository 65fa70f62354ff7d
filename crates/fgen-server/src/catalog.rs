//! Publicly visible features of an installation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use fgen_reconcile::{FeatureSet, VisibleFeatureCatalog};

pub const CORE_FEATURES_DIR: &str = "lib/features";
pub const USER_FEATURES_DIR: &str = "extension/lib/features";

const SYMBOLIC_NAME: &str = "Subsystem-SymbolicName";
const SHORT_NAME: &str = "IBM-ShortName";

/// Parse manifest headers, folding continuation lines (leading single space).
pub fn manifest_headers(text: &str) -> BTreeMap<String, String> {
    let mut logical: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some(last) = logical.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        if !line.is_empty() {
            logical.push(line.to_string());
        }
    }

    logical
        .into_iter()
        .filter_map(|l| {
            let (k, v) = l.split_once(':')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

/// Short name of a feature manifest, if the feature is public.
pub fn public_short_name(text: &str) -> Option<String> {
    let headers = manifest_headers(text);
    let symbolic = headers.get(SYMBOLIC_NAME)?;
    let public = symbolic
        .split(';')
        .skip(1)
        .filter_map(|d| d.split_once(":="))
        .any(|(k, v)| k.trim() == "visibility" && v.trim().trim_matches('"') == "public");
    if !public {
        return None;
    }
    let short = headers.get(SHORT_NAME)?.trim();
    (!short.is_empty()).then(|| short.to_string())
}

/// Scans `*.mf` feature manifests under the core and user feature directories.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    dirs: Vec<PathBuf>,
}

impl ManifestCatalog {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn for_installation(install_dir: &Path, user_dir: Option<&Path>) -> Self {
        let mut dirs = vec![install_dir.join(CORE_FEATURES_DIR)];
        if let Some(u) = user_dir {
            dirs.push(u.join(USER_FEATURES_DIR));
        }
        Self::new(dirs)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl VisibleFeatureCatalog for ManifestCatalog {
    fn visible_features(&self) -> FeatureSet {
        let mut out = FeatureSet::new();
        for dir in &self.dirs {
            let entries = match fs::read_dir(dir) {
                Ok(e) => e,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "feature directory not readable");
                    continue;
                }
            };
            let mut manifests: Vec<PathBuf> = entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|x| x == "mf"))
                .collect();
            manifests.sort();

            for path in manifests {
                match fs::read_to_string(&path) {
                    Ok(text) => {
                        if let Some(name) = public_short_name(&text) {
                            out.insert(name);
                        }
                    }
                    Err(e) => warn!(manifest = %path.display(), error = %e, "skipping unreadable feature manifest"),
                }
            }
        }
        debug!(count = out.len(), "visible features");
        out
    }
}

/// Fixed list of visible features, one per line. `#` starts a comment.
#[derive(Debug, Clone, Default)]
pub struct ListCatalog {
    features: FeatureSet,
}

pub fn parse_feature_list(text: &str) -> FeatureSet {
    text.lines()
        .map(|l| l.split('#').next().unwrap_or("").trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

impl ListCatalog {
    pub fn new(features: FeatureSet) -> Self {
        Self { features }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read visible feature list failed: {}", path.display()))?;
        Ok(Self::new(parse_feature_list(&text)))
    }
}

impl VisibleFeatureCatalog for ListCatalog {
    fn visible_features(&self) -> FeatureSet {
        self.features.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVLET_MF: &str = "Manifest-Version: 1.0\r\n\
Subsystem-SymbolicName: com.ibm.websphere.appserver.servlet-4.0; visibili\r\n ty:=public; singleton:=true\r\n\
IBM-ShortName: servlet-4.0\r\n";

    #[test]
    fn continuation_lines_are_folded() {
        let h = manifest_headers(SERVLET_MF);
        assert_eq!(
            h.get(SYMBOLIC_NAME).map(String::as_str),
            Some("com.ibm.websphere.appserver.servlet-4.0; visibility:=public; singleton:=true")
        );
        assert_eq!(public_short_name(SERVLET_MF).as_deref(), Some("servlet-4.0"));
    }

    #[test]
    fn private_and_unnamed_features_are_not_visible() {
        let private = "Subsystem-SymbolicName: com.ibm.ws.internal; visibility:=private\nIBM-ShortName: internal-1.0\n";
        assert_eq!(public_short_name(private), None);

        let unnamed = "Subsystem-SymbolicName: com.ibm.ws.auto; visibility:=public\n";
        assert_eq!(public_short_name(unnamed), None);
    }

    #[test]
    fn list_ignores_blanks_and_comments() {
        let f = parse_feature_list("# core\nservlet-4.0\n\n  jsp-2.3  # pages\n");
        assert_eq!(
            f.into_iter().collect::<Vec<_>>(),
            vec!["jsp-2.3".to_string(), "servlet-4.0".to_string()]
        );
    }
}
