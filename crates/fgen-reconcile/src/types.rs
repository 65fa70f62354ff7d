use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Ordered set of feature identifiers. Ordering keeps every output deterministic.
pub type FeatureSet = BTreeSet<String>;

/// Enterprise platform level in effect for a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EeLevel {
    Ee7,
    Ee8,
}

impl EeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EeLevel::Ee7 => "ee7",
            EeLevel::Ee8 => "ee8",
        }
    }
}

impl fmt::Display for EeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MicroProfile release level in effect for a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MpLevel {
    Mp1,
    Mp2,
    Mp3,
    Mp4,
}

impl MpLevel {
    /// Highest level known to the compatibility table.
    pub const LATEST: MpLevel = MpLevel::Mp4;

    /// Map a table ordinal to a level. `0` (no signal) and anything above the
    /// table fall forward to [`MpLevel::LATEST`].
    pub fn from_ordinal(n: u8) -> Self {
        match n {
            1 => MpLevel::Mp1,
            2 => MpLevel::Mp2,
            3 => MpLevel::Mp3,
            _ => MpLevel::LATEST,
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            MpLevel::Mp1 => 1,
            MpLevel::Mp2 => 2,
            MpLevel::Mp3 => 3,
            MpLevel::Mp4 => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MpLevel::Mp1 => "mp1",
            MpLevel::Mp2 => "mp2",
            MpLevel::Mp3 => "mp3",
            MpLevel::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform levels inferred from the declared dependencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlatformLevels {
    /// `None` when no provided dependency names a known platform artifact.
    pub ee: Option<EeLevel>,
    pub mp: MpLevel,
}

/// The scanner asked for a stricter version than the one already declared.
///
/// The declared version stays authoritative; this is a warning only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct VersionConflict {
    /// Full identifier as recommended by the scanner, e.g. `mphealth-3.0`.
    pub scanned_feature: String,
    /// Lower-cased short name shared by both sides.
    pub name: String,
    pub scanned_version: String,
    /// Version currently declared or planned for `name`.
    pub declared_version: String,
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The binary scanner detected a dependency on {} but the project's POM or \
             server.xml specified the dependency {}-{}.",
            self.scanned_feature, self.name, self.declared_version
        )
    }
}

/// What happened to the scanner step of a reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    /// No classes directories were available to scan.
    Skipped,
    /// The scanner could not produce a result; recommendations are empty.
    Unavailable { reason: String },
    /// The scanner returned this many recommended features.
    Completed { recommended: usize },
}

/// Output of the reconciliation engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Features that must be newly declared.
    pub missing: FeatureSet,
    /// Conflict warnings, sorted.
    pub conflicts: Vec<VersionConflict>,
    pub platform: PlatformLevels,
    pub scan: ScanStatus,
}

impl ReconciliationResult {
    /// `true` when nothing needs to be declared.
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }
}
