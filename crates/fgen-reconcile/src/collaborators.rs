//! Boundaries the engine consumes.
//!
//! Everything behind these traits does I/O: reading server configuration,
//! running the scanner, writing the generated declaration. The engine itself
//! stays pure and only sequences the calls.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::{EeLevel, FeatureSet, MpLevel};

// ---------------------------------------------------------------------------
// Installed-feature inventory
// ---------------------------------------------------------------------------

/// Failure reading the features already declared for the server.
#[derive(Debug)]
pub struct InventoryError {
    /// File or resource that could not be read.
    pub source_path: PathBuf,
    pub cause: std::io::Error,
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to read server configuration '{}': {}",
            self.source_path.display(),
            self.cause
        )
    }
}

impl std::error::Error for InventoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Features already declared in existing configuration, original casing kept.
pub trait FeatureInventory {
    fn installed_features(&self) -> Result<FeatureSet, InventoryError>;
}

// ---------------------------------------------------------------------------
// Visible-feature catalog
// ---------------------------------------------------------------------------

/// Every feature the target installation allows to be declared.
pub trait VisibleFeatureCatalog {
    fn visible_features(&self) -> FeatureSet;
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Input for one scanner invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    /// Compiled class directories, own project first.
    pub classes_dirs: Vec<PathBuf>,
    pub ee_level: Option<EeLevel>,
    pub mp_level: MpLevel,
    /// Features already declared, passed so the scanner can align with them.
    pub known_features: Vec<String>,
    pub locale: String,
}

/// Result of one scanner invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Recommended(FeatureSet),
    /// The scanner is missing or failed. Never fatal.
    Unavailable { reason: String },
}

impl ScanOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ScanOutcome::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Static analysis of compiled application code.
pub trait FeatureScanner {
    fn scan(&self, request: &ScanRequest) -> ScanOutcome;
}

/// A scanner that never has anything to say.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScanner;

impl FeatureScanner for NoScanner {
    fn scan(&self, _request: &ScanRequest) -> ScanOutcome {
        ScanOutcome::unavailable("no binary scanner configured")
    }
}

// ---------------------------------------------------------------------------
// Declaration writer
// ---------------------------------------------------------------------------

/// Failure producing or removing the generated declaration.
#[derive(Debug)]
pub struct DeclarationError {
    pub path: PathBuf,
    pub action: &'static str,
    pub cause: std::io::Error,
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to {} '{}': {}",
            self.action,
            self.path.display(),
            self.cause
        )
    }
}

impl std::error::Error for DeclarationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Materializes the missing features as a configuration declaration.
///
/// `write_declaration` is all-or-nothing: on error nothing new is left behind.
pub trait DeclarationWriter {
    /// Take the previously generated declaration out of the server so it is
    /// not read back as "already declared".
    fn retract_previous(&mut self) -> Result<(), DeclarationError>;

    /// Undo [`retract_previous`](DeclarationWriter::retract_previous).
    fn restore_previous(&mut self) -> Result<(), DeclarationError>;

    /// Write `features`; returns the path of the generated file.
    fn write_declaration(&mut self, features: &FeatureSet) -> Result<PathBuf, DeclarationError>;
}
