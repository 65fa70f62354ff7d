//! Merge scanner recommendations into the missing set.
//!
//! Declarations already in configuration, and features the build is about
//! to declare, always win over the scanner. The scanner only fills gaps.

use std::collections::BTreeMap;

use tracing::debug;

use crate::feature_name::parse_feature_name;
use crate::{FeatureSet, VersionConflict};

/// Output of [`merge_scan_results`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanMerge {
    pub missing: FeatureSet,
    pub conflicts: Vec<VersionConflict>,
}

/// Short name -> version in force. `missing` entries override `existing` ones.
fn versions_in_force(existing: &FeatureSet, missing: &FeatureSet) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for id in existing.iter().chain(missing.iter()) {
        if let Some(f) = parse_feature_name(id) {
            map.insert(f.name, f.version);
        }
    }
    map
}

/// Reconcile `scanned` against `existing` and the planned `missing` set.
///
/// - name unknown on both sides: the scanned feature is added;
/// - version in force older than the scanned one: a [`VersionConflict`] is
///   reported and nothing changes;
/// - otherwise nothing happens.
///
/// Versions compare lexically.
pub fn merge_scan_results(
    scanned: &FeatureSet,
    existing: &FeatureSet,
    missing: &FeatureSet,
) -> ScanMerge {
    let in_force = versions_in_force(existing, missing);
    let mut out = missing.clone();
    let mut conflicts = Vec::new();

    for scanned_feature in scanned {
        let Some(f) = parse_feature_name(scanned_feature) else {
            debug!(feature = %scanned_feature, "ignoring malformed scanned feature");
            continue;
        };
        match in_force.get(&f.name) {
            Some(declared) => {
                if declared.as_str() < f.version.as_str() {
                    conflicts.push(VersionConflict {
                        scanned_feature: scanned_feature.clone(),
                        name: f.name,
                        scanned_version: f.version,
                        declared_version: declared.clone(),
                    });
                }
            }
            None => {
                debug!(feature = %scanned_feature, "adding feature detected by binary scanner");
                out.insert(scanned_feature.clone());
            }
        }
    }

    conflicts.sort();
    ScanMerge {
        missing: out,
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> FeatureSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stricter_scan_against_existing_warns_without_override() {
        let r = merge_scan_results(
            &set(&["mphealth-3.0"]),
            &set(&["mphealth-2.0"]),
            &FeatureSet::new(),
        );
        assert!(r.missing.is_empty());
        assert_eq!(
            r.conflicts,
            vec![VersionConflict {
                scanned_feature: "mphealth-3.0".to_string(),
                name: "mphealth".to_string(),
                scanned_version: "3.0".to_string(),
                declared_version: "2.0".to_string(),
            }]
        );
    }

    #[test]
    fn new_scanned_feature_is_added_unchanged() {
        let r = merge_scan_results(
            &set(&["mpmetrics-2.3"]),
            &set(&["servlet-4.0"]),
            &set(&["jsp-2.3"]),
        );
        assert_eq!(r.missing, set(&["jsp-2.3", "mpmetrics-2.3"]));
        assert!(r.conflicts.is_empty());
    }

    #[test]
    fn equal_or_newer_declaration_is_silent() {
        let r = merge_scan_results(
            &set(&["mpconfig-1.4", "cdi-2.0"]),
            &set(&["mpConfig-1.4"]),
            &set(&["cdi-2.2"]),
        );
        assert_eq!(r.missing, set(&["cdi-2.2"]));
        assert!(r.conflicts.is_empty());
    }

    #[test]
    fn planned_missing_overrides_existing_version() {
        // existing says 1.3, the build plans 2.0: 2.0 is what the scan is checked against.
        let r = merge_scan_results(
            &set(&["mpconfig-1.4"]),
            &set(&["mpconfig-1.3"]),
            &set(&["mpconfig-2.0"]),
        );
        assert!(r.conflicts.is_empty());
        assert_eq!(r.missing, set(&["mpconfig-2.0"]));
    }

    #[test]
    fn conflict_against_planned_feature() {
        let r = merge_scan_results(
            &set(&["jaxrs-2.1"]),
            &FeatureSet::new(),
            &set(&["jaxrs-2.0"]),
        );
        assert_eq!(r.conflicts.len(), 1);
        assert_eq!(r.conflicts[0].declared_version, "2.0");
        assert_eq!(r.missing, set(&["jaxrs-2.0"]));
    }

    #[test]
    fn malformed_entries_are_ignored() {
        let r = merge_scan_results(
            &set(&["garbage", "servlet-4"]),
            &set(&["alsogarbage"]),
            &FeatureSet::new(),
        );
        assert!(r.missing.is_empty());
        assert!(r.conflicts.is_empty());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let missing = set(&["jsp-2.3"]);
        let _ = merge_scan_results(&set(&["cdi-2.0"]), &FeatureSet::new(), &missing);
        assert_eq!(missing, set(&["jsp-2.3"]));
    }

    #[test]
    fn conflict_message_names_both_versions() {
        let c = VersionConflict {
            scanned_feature: "mphealth-3.0".to_string(),
            name: "mphealth".to_string(),
            scanned_version: "3.0".to_string(),
            declared_version: "2.0".to_string(),
        };
        let msg = c.to_string();
        assert!(msg.contains("dependency on mphealth-3.0"));
        assert!(msg.contains("specified the dependency mphealth-2.0"));
    }
}
