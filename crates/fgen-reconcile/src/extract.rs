//! Dependency-derived features, visibility filtering, and the missing set.

use std::collections::BTreeSet;

use fgen_schemas::DependencyRef;

use crate::FeatureSet;

/// How visibility membership compares feature names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseMode {
    /// Names must match exactly.
    #[default]
    Exact,
    /// Names are compared ASCII-lower-cased; output keeps the dependency's casing.
    Insensitive,
}

/// Artifact ids of every feature-archive dependency, regardless of scope.
pub fn features_from_dependencies(dependencies: &[DependencyRef]) -> FeatureSet {
    dependencies
        .iter()
        .filter(|d| d.is_feature_archive())
        .map(|d| d.artifact_id.clone())
        .collect()
}

/// Dependency features the server allows to be declared. Hidden ones are dropped.
pub fn visible_features(
    dependency_features: &FeatureSet,
    all_visible: &FeatureSet,
    case: CaseMode,
) -> FeatureSet {
    match case {
        CaseMode::Exact => dependency_features
            .intersection(all_visible)
            .cloned()
            .collect(),
        CaseMode::Insensitive => {
            let keys: BTreeSet<String> =
                all_visible.iter().map(|f| f.to_ascii_lowercase()).collect();
            dependency_features
                .iter()
                .filter(|f| keys.contains(&f.to_ascii_lowercase()))
                .cloned()
                .collect()
        }
    }
}

/// `visible - already_declared`, compared against the declared casing as-is.
pub fn missing_features(visible: &FeatureSet, already_declared: &FeatureSet) -> FeatureSet {
    visible.difference(already_declared).cloned().collect()
}
