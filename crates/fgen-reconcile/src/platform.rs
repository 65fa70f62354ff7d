//! Platform level detection from declared dependencies.
//!
//! Only `provided` dependencies are signals: they describe what the server
//! supplies at runtime. Nothing here fails; unknown input falls back to
//! "no EE level" and the latest MicroProfile level.

use fgen_schemas::DependencyRef;
use tracing::debug;

use crate::mp_table::mp_component_level;
use crate::{EeLevel, MpLevel, PlatformLevels};

/// Group of feature-archive artifacts.
pub const FEATURES_GROUP: &str = "io.openliberty.features";
pub const MICROPROFILE_GROUP: &str = "org.eclipse.microprofile";
pub const MICROPROFILE_UMBRELLA: &str = "microprofile";

/// (groupId, artifactId, required version) -> EE level. `None` matches any version.
static EE_ARTIFACTS: &[(&str, &str, Option<&str>, EeLevel)] = &[
    (FEATURES_GROUP, "javaee-7.0", None, EeLevel::Ee7),
    (FEATURES_GROUP, "javaee-8.0", None, EeLevel::Ee8),
    (FEATURES_GROUP, "javaeeClient-7.0", None, EeLevel::Ee7),
    (FEATURES_GROUP, "javaeeClient-8.0", None, EeLevel::Ee8),
    (FEATURES_GROUP, "jakartaee-8.0", None, EeLevel::Ee8),
    ("jakarta.platform", "jakarta.jakartaee-api", Some("8.0.0"), EeLevel::Ee8),
];

fn ee_level_of(dep: &DependencyRef) -> Option<EeLevel> {
    EE_ARTIFACTS
        .iter()
        .find(|(group, artifact, version, _)| {
            dep.group_id == *group
                && dep.artifact_id == *artifact
                && version.map_or(true, |v| dep.version == v)
        })
        .map(|(_, _, _, level)| *level)
}

/// EE level from the first matching provided dependency.
pub fn detect_ee_level(dependencies: &[DependencyRef]) -> Option<EeLevel> {
    for dep in dependencies.iter().filter(|d| d.is_provided()) {
        debug!(dep = %dep.coordinates(), "ee level candidate");
        if let Some(level) = ee_level_of(dep) {
            return Some(level);
        }
    }
    None
}

fn umbrella_level(version: &str) -> MpLevel {
    match version.chars().next() {
        Some('1') => MpLevel::Mp1,
        Some('2') => MpLevel::Mp2,
        Some('3') => MpLevel::Mp3,
        _ => MpLevel::LATEST,
    }
}

/// MicroProfile level for the build.
///
/// A provided umbrella `org.eclipse.microprofile:microprofile` dependency
/// decides immediately. Otherwise the highest level required by any provided
/// feature artifact wins; no signal at all means [`MpLevel::LATEST`].
pub fn detect_mp_level(dependencies: &[DependencyRef]) -> MpLevel {
    let mut highest = 0u8;
    for dep in dependencies.iter().filter(|d| d.is_provided()) {
        if dep.group_id == MICROPROFILE_GROUP && dep.artifact_id == MICROPROFILE_UMBRELLA {
            debug!(version = %dep.version, "microprofile umbrella dependency");
            return umbrella_level(&dep.version);
        }
        if dep.group_id == FEATURES_GROUP {
            highest = highest.max(mp_component_level(&dep.artifact_id));
            debug!(dep = %dep.artifact_id, mp = highest, "microprofile component");
        }
    }
    MpLevel::from_ordinal(highest)
}

pub fn detect_platform(dependencies: &[DependencyRef]) -> PlatformLevels {
    PlatformLevels {
        ee: detect_ee_level(dependencies),
        mp: detect_mp_level(dependencies),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(group: &str, artifact: &str, version: &str, scope: &str) -> DependencyRef {
        DependencyRef::new(group, artifact, version, scope, "esa")
    }

    #[test]
    fn ee_requires_provided_scope() {
        let deps = vec![dep(FEATURES_GROUP, "javaee-8.0", "21.0.0.3", "compile")];
        assert_eq!(detect_ee_level(&deps), None);

        let deps = vec![dep(FEATURES_GROUP, "javaee-8.0", "21.0.0.3", "provided")];
        assert_eq!(detect_ee_level(&deps), Some(EeLevel::Ee8));
    }

    #[test]
    fn ee_first_match_wins() {
        let deps = vec![
            dep(FEATURES_GROUP, "servlet-4.0", "21.0.0.3", "provided"),
            dep(FEATURES_GROUP, "javaeeClient-7.0", "21.0.0.3", "provided"),
            dep(FEATURES_GROUP, "jakartaee-8.0", "21.0.0.3", "provided"),
        ];
        assert_eq!(detect_ee_level(&deps), Some(EeLevel::Ee7));
    }

    #[test]
    fn jakarta_api_needs_exact_version() {
        let pom = |v: &str| {
            vec![DependencyRef::new(
                "jakarta.platform",
                "jakarta.jakartaee-api",
                v,
                "provided",
                "jar",
            )]
        };
        assert_eq!(detect_ee_level(&pom("8.0.0")), Some(EeLevel::Ee8));
        assert_eq!(detect_ee_level(&pom("9.1.0")), None);
    }

    #[test]
    fn umbrella_leading_digit_selects_level() {
        for (v, want) in [
            ("1.4", MpLevel::Mp1),
            ("2.2", MpLevel::Mp2),
            ("3.3", MpLevel::Mp3),
            ("4.0.1", MpLevel::Mp4),
            ("5.0", MpLevel::Mp4),
        ] {
            let deps = vec![DependencyRef::new(
                MICROPROFILE_GROUP,
                MICROPROFILE_UMBRELLA,
                v,
                "provided",
                "pom",
            )];
            assert_eq!(detect_mp_level(&deps), want, "umbrella version {v}");
        }
    }

    #[test]
    fn umbrella_short_circuits_component_scan() {
        let deps = vec![
            dep(FEATURES_GROUP, "mpconfig-2.0", "21.0.0.3", "provided"),
            DependencyRef::new(MICROPROFILE_GROUP, MICROPROFILE_UMBRELLA, "2.2", "provided", "pom"),
        ];
        assert_eq!(detect_mp_level(&deps), MpLevel::Mp2);
    }

    #[test]
    fn components_take_the_maximum_level() {
        let deps = vec![
            dep(FEATURES_GROUP, "mpjwt-1.1", "21.0.0.3", "provided"),
            dep(FEATURES_GROUP, "mpopenapi-1.0", "21.0.0.3", "provided"),
            dep(FEATURES_GROUP, "mprestclient-1.2", "21.0.0.3", "provided"),
        ];
        assert_eq!(detect_mp_level(&deps), MpLevel::Mp3);
    }

    #[test]
    fn no_signal_defaults_to_latest() {
        assert_eq!(detect_mp_level(&[]), MpLevel::Mp4);
        let deps = vec![dep(FEATURES_GROUP, "mpconfig-1.3", "21.0.0.3", "compile")];
        assert_eq!(detect_mp_level(&deps), MpLevel::Mp4);
    }

    #[test]
    fn provided_esa_is_platform_candidate() {
        let deps = vec![dep(FEATURES_GROUP, "mpconfig-1.4", "21.0.0.3", "provided")];
        let p = detect_platform(&deps);
        assert_eq!(p.ee, None);
        assert_eq!(p.mp, MpLevel::Mp3);
    }
}
