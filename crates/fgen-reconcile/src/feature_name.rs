//! Feature identifier codec.
//!
//! A feature identifier has the form `shortName-version`, e.g. `mpconfig-2.0`.
//! Decoding never fails loudly: anything that does not fit the shape yields
//! `None` and callers skip the entry.

/// Length of the version suffix, e.g. `2.0`.
pub const VERSION_LEN: usize = 3;

/// Decoded feature identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureName {
    /// Lower-cased short name.
    pub name: String,
    /// Version exactly as written.
    pub version: String,
}

impl FeatureName {
    /// Reassemble `name-version`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// Split `feature_id` on its first hyphen into a lower-cased name and a
/// three-character version.
pub fn parse_feature_name(feature_id: &str) -> Option<FeatureName> {
    let (name, version) = feature_id.split_once('-')?;
    if name.is_empty() || version.chars().count() != VERSION_LEN {
        return None;
    }
    Some(FeatureName {
        name: name.to_lowercase(),
        version: version.to_string(),
    })
}
