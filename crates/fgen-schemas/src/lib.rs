use serde::{Deserialize, Serialize};

/// Scope that marks a dependency as supplied by the server at runtime.
pub const SCOPE_PROVIDED: &str = "provided";

/// Packaging type of a feature archive.
pub const TYPE_FEATURE_ARCHIVE: &str = "esa";

fn default_scope() -> String {
    "compile".to_string()
}

fn default_kind() -> String {
    "jar".to_string()
}

/// A dependency as declared by the build project. Read-only input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRef {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

impl DependencyRef {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        scope: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            scope: scope.into(),
            kind: kind.into(),
        }
    }

    pub fn is_provided(&self) -> bool {
        self.scope == SCOPE_PROVIDED
    }

    pub fn is_feature_archive(&self) -> bool {
        self.kind == TYPE_FEATURE_ARCHIVE
    }

    /// `groupId:artifactId:version` for log lines.
    pub fn coordinates(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Project descriptor handed to the generator.
///
/// `output_directory` is the project's own build output; `upstream_output_directories`
/// are the build outputs of modules this project depends on, in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
    #[serde(default)]
    pub output_directory: Option<String>,
    #[serde(default)]
    pub upstream_output_directories: Vec<String>,
}

impl ProjectModel {
    /// Own output directory first, then upstream ones.
    pub fn candidate_output_directories(&self) -> Vec<&str> {
        self.output_directory
            .iter()
            .map(|s| s.as_str())
            .chain(self.upstream_output_directories.iter().map(|s| s.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_scope_and_type_use_maven_defaults() {
        let d: DependencyRef = serde_json::from_str(
            r#"{"groupId":"io.openliberty.features","artifactId":"servlet-4.0"}"#,
        )
        .unwrap();
        assert_eq!(d.scope, "compile");
        assert_eq!(d.kind, "jar");
        assert!(!d.is_provided());
        assert!(!d.is_feature_archive());
    }

    #[test]
    fn type_field_maps_to_kind() {
        let d: DependencyRef = serde_json::from_str(
            r#"{"groupId":"g","artifactId":"mpconfig-1.4","version":"21.0.0.3","scope":"provided","type":"esa"}"#,
        )
        .unwrap();
        assert!(d.is_provided());
        assert!(d.is_feature_archive());
        assert_eq!(d.coordinates(), "g:mpconfig-1.4:21.0.0.3");
    }

    #[test]
    fn output_directories_are_own_first() {
        let p = ProjectModel {
            dependencies: Vec::new(),
            output_directory: Some("app/target/classes".to_string()),
            upstream_output_directories: vec!["lib/target/classes".to_string()],
        };
        assert_eq!(
            p.candidate_output_directories(),
            vec!["app/target/classes", "lib/target/classes"]
        );
    }
}
