use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

mod generator;

pub use generator::{
    FeaturesSection, GeneratorConfig, LoggingSection, ScannerSection, ServerSection,
};

/// JSON-pointer prefixes read by the generator. A leaf under any of these is
/// consumed; anything else is reported by [`report_unused_keys`].
///
/// Must match the fields of [`GeneratorConfig`].
pub const CONSUMED_POINTERS: &[&str] = &[
    "/server/install_dir",
    "/server/user_dir",
    "/server/server_dir",
    "/server/config_dir",
    "/server/server_xml",
    "/scanner/command",
    "/scanner/args",
    "/scanner/locale",
    "/features/case_insensitive_visibility",
    "/features/visible_list",
    "/logging/filter",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// `true` when `pointer` is a consumed key or sits below one.
///
/// `/scanner/args` consumes `/scanner/args/0` but not `/scanner/argsx`.
fn is_consumed(pointer: &str) -> bool {
    CONSUMED_POINTERS.iter().any(|consumed| {
        pointer
            .strip_prefix(*consumed)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// JSON-pointer token for an object key (RFC 6901).
fn pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Every scalar or empty array in `root`, as a JSON pointer, sorted.
fn leaf_pointers(root: &Value) -> Vec<String> {
    let mut leaves = Vec::new();
    let mut pending: Vec<(String, &Value)> = vec![(String::new(), root)];
    while let Some((pointer, value)) = pending.pop() {
        match value {
            Value::Object(map) => {
                for (k, child) in map {
                    pending.push((format!("{pointer}/{}", pointer_token(k)), child));
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (i, child) in items.iter().enumerate() {
                    pending.push((format!("{pointer}/{i}"), child));
                }
            }
            _ if pointer.is_empty() => {}
            _ => leaves.push(pointer),
        }
    }
    leaves.sort();
    leaves
}

/// Report config keys the generator never reads.
///
/// `Warn` always returns the report; `Fail` errors with `CONFIG_UNUSED_KEYS`
/// when the report is not clean.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed_prefixes: Vec<String> = CONSUMED_POINTERS
        .iter()
        .map(|p| p.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let unused_leaf_pointers: Vec<String> = leaf_pointers(config_json)
        .into_iter()
        .filter(|leaf| !is_consumed(leaf))
        .collect();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let shown: Vec<&str> = report
            .unused_leaf_pointers
            .iter()
            .take(12)
            .map(String::as_str)
            .collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} config key(s) not read by the generator: {}",
            report.unused_leaf_pointers.len(),
            shown.join(", ")
        );
    }

    Ok(report)
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed view with defaults applied.
    pub fn generator(&self) -> Result<GeneratorConfig> {
        GeneratorConfig::from_json(&self.config_json)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Map::new());
    for (i, raw) in yaml_docs.iter().enumerate() {
        let doc: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml in layer {i}"))?;
        let doc = serde_json::to_value(doc)
            .with_context(|| format!("layer {i} is not representable as json"))?;
        // Empty documents parse as null.
        if !doc.is_null() {
            overlay(&mut merged, doc);
        }
    }

    // Map keys are kept sorted, so compact output is already canonical.
    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Apply `top` over `base`: objects merge key by key, anything else replaces.
fn overlay(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Object(base_map), Value::Object(top_map)) => {
            for (k, v) in top_map {
                match base_map.get_mut(&k) {
                    Some(existing) => overlay(existing, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (slot, top) => *slot = top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn consumed_prefix_respects_segment_boundary() {
        assert!(is_consumed("/scanner/args/0"));
        assert!(is_consumed("/scanner/args"));
        assert!(!is_consumed("/scanner/argsx"));
        assert!(!is_consumed("/scanner"));
    }

    #[test]
    fn empty_array_is_a_leaf_empty_object_is_not() {
        let v = json!({"scanner": {"args": []}, "features": {}});
        assert_eq!(leaf_pointers(&v), vec!["/scanner/args"]);
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        assert_eq!(leaf_pointers(&json!({"a/b": {"c~d": 1}})), vec!["/a~1b/c~0d"]);
    }

    #[test]
    fn overlay_merges_objects_and_replaces_arrays() {
        let mut base = json!({"scanner": {"args": ["a", "b"], "locale": "en"}});
        overlay(&mut base, json!({"scanner": {"args": ["c"]}, "logging": {"filter": "debug"}}));
        assert_eq!(
            base,
            json!({"scanner": {"args": ["c"], "locale": "en"}, "logging": {"filter": "debug"}})
        );
    }
}
