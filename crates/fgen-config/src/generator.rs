//! Typed view of the merged configuration.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub server: ServerSection,
    pub scanner: ScannerSection,
    pub features: FeaturesSection,
    pub logging: LoggingSection,
}

/// Locations of the server installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub install_dir: Option<PathBuf>,
    /// Defaults to `<install_dir>/usr`.
    pub user_dir: Option<PathBuf>,
    pub server_dir: Option<PathBuf>,
    /// Source configuration directory. Defaults to `server_dir`.
    pub config_dir: Option<PathBuf>,
    /// Primary configuration file. Defaults to `<config_dir>/server.xml`.
    pub server_xml: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSection {
    /// Scanner executable. Absent means no scan.
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
    pub locale: String,
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            locale: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesSection {
    pub case_insensitive_visibility: bool,
    /// Newline-separated list of visible features used instead of the
    /// installation's manifests.
    pub visible_list: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(v: &Value) -> Result<Self> {
        let cfg: GeneratorConfig =
            serde_json::from_value(v.clone()).context("invalid generator config")?;
        Ok(cfg)
    }

    pub fn user_dir(&self) -> Option<PathBuf> {
        self.server
            .user_dir
            .clone()
            .or_else(|| self.server.install_dir.as_ref().map(|d| d.join("usr")))
    }

    pub fn server_dir(&self) -> Result<PathBuf> {
        match &self.server.server_dir {
            Some(d) => Ok(d.clone()),
            None => bail!("CONFIG_MISSING: /server/server_dir is required"),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.server.config_dir {
            Some(d) => Ok(d.clone()),
            None => self.server_dir(),
        }
    }

    pub fn server_xml(&self) -> Result<PathBuf> {
        match &self.server.server_xml {
            Some(p) => Ok(p.clone()),
            None => Ok(self.config_dir()?.join("server.xml")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_config() {
        let cfg = GeneratorConfig::from_json(&serde_json::json!({})).unwrap();
        assert_eq!(cfg.scanner.locale, "en");
        assert_eq!(cfg.logging.filter, "info");
        assert!(!cfg.features.case_insensitive_visibility);
        assert!(cfg.server_dir().is_err());
    }

    #[test]
    fn derived_paths_fall_back_in_order() {
        let cfg = GeneratorConfig::from_json(&serde_json::json!({
            "server": { "install_dir": "/wlp", "server_dir": "/wlp/usr/servers/app" }
        }))
        .unwrap();
        assert_eq!(cfg.user_dir(), Some(PathBuf::from("/wlp/usr")));
        assert_eq!(cfg.config_dir().unwrap(), PathBuf::from("/wlp/usr/servers/app"));
        assert_eq!(
            cfg.server_xml().unwrap(),
            PathBuf::from("/wlp/usr/servers/app/server.xml")
        );
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = GeneratorConfig::from_json(&serde_json::json!({
            "features": { "case_insensitive_visibility": "yes" }
        }));
        assert!(err.is_err());
    }
}
