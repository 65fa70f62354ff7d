use std::fmt;
use std::path::PathBuf;

use fgen_schemas::DependencyRef;
use tracing::{debug, error, warn};

use crate::collaborators::{
    DeclarationError, DeclarationWriter, FeatureInventory, FeatureScanner, InventoryError,
    ScanOutcome, ScanRequest, VisibleFeatureCatalog,
};
use crate::extract::{features_from_dependencies, missing_features, visible_features, CaseMode};
use crate::merge::merge_scan_results;
use crate::platform::detect_platform;
use crate::{FeatureSet, PlatformLevels, ReconciliationResult, ScanStatus};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures that abort a reconciliation. Everything else degrades locally.
#[derive(Debug)]
pub enum ReconcileError {
    /// Existing configuration could not be read; nothing was changed.
    Inventory(InventoryError),
    /// The generated declaration could not be written or the previous one removed.
    Declaration(DeclarationError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::Inventory(e) => write!(
                f,
                "error attempting to generate server feature list: {e}. Ensure your user \
                 account has read permission to the property files in the server installation \
                 directory."
            ),
            ReconcileError::Declaration(e) if e.action == "read" => write!(
                f,
                "error attempting to create the server feature file: {e}. Ensure your id has \
                 read permission to the server configuration files and that they are readable \
                 in the encoding they declare."
            ),
            ReconcileError::Declaration(e) => write!(
                f,
                "error attempting to create the server feature file: {e}. Ensure your id has \
                 write permission to the server installation directory."
            ),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Inventory(e) => Some(e),
            ReconcileError::Declaration(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Tunables for one reconciler.
#[derive(Clone, Debug)]
pub struct ReconcileOptions {
    pub case: CaseMode,
    /// Locale handed to the scanner for its messages.
    pub locale: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            case: CaseMode::Exact,
            locale: "en".to_string(),
        }
    }
}

/// Project facts for one invocation.
#[derive(Clone, Copy, Debug)]
pub struct ReconcileInputs<'a> {
    pub dependencies: &'a [DependencyRef],
    /// Existing compiled-class directories. Empty skips the scanner.
    pub classes_dirs: &'a [PathBuf],
}

/// Result of [`FeatureReconciler::generate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub result: ReconciliationResult,
    /// Generated file, `None` when nothing was missing.
    pub written: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Pure phases
// ---------------------------------------------------------------------------

/// Dependency features that are visible but not yet declared.
pub fn plan_from_dependencies(
    dependencies: &[DependencyRef],
    all_visible: &FeatureSet,
    existing: &FeatureSet,
    case: CaseMode,
) -> FeatureSet {
    let from_deps = features_from_dependencies(dependencies);
    debug!(features = ?from_deps, "dependencies that are features");
    let visible = visible_features(&from_deps, all_visible, case);
    debug!(features = ?visible, "dependencies that are visible features");
    let missing = missing_features(&visible, existing);
    debug!(features = ?missing, "visible dependency features missing from configuration");
    missing
}

fn scan_request(
    inputs: &ReconcileInputs<'_>,
    platform: PlatformLevels,
    existing: &FeatureSet,
    locale: &str,
) -> ScanRequest {
    ScanRequest {
        classes_dirs: inputs.classes_dirs.to_vec(),
        ee_level: platform.ee,
        mp_level: platform.mp,
        known_features: existing.iter().cloned().collect(),
        locale: locale.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Sequences the phases over borrowed collaborators.
pub struct FeatureReconciler<'a> {
    inventory: &'a dyn FeatureInventory,
    catalog: &'a dyn VisibleFeatureCatalog,
    scanner: &'a dyn FeatureScanner,
    options: ReconcileOptions,
}

impl<'a> FeatureReconciler<'a> {
    pub fn new(
        inventory: &'a dyn FeatureInventory,
        catalog: &'a dyn VisibleFeatureCatalog,
        scanner: &'a dyn FeatureScanner,
    ) -> Self {
        Self {
            inventory,
            catalog,
            scanner,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Compute the features to declare. Performs no writes.
    pub fn reconcile(
        &self,
        inputs: &ReconcileInputs<'_>,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let all_visible = self.catalog.visible_features();

        let existing = self
            .inventory
            .installed_features()
            .map_err(ReconcileError::Inventory)?;
        debug!(features = ?existing, "existing features");

        let planned =
            plan_from_dependencies(inputs.dependencies, &all_visible, &existing, self.options.case);

        let platform = detect_platform(inputs.dependencies);
        debug!(ee = ?platform.ee, mp = %platform.mp, "platform levels");

        let (scanned, scan) = self.run_scanner(inputs, platform, &existing);
        let merged = merge_scan_results(&scanned, &existing, &planned);
        for conflict in &merged.conflicts {
            warn!("{conflict}");
        }
        let missing = self.keep_visible_additions(merged.missing, &planned, &all_visible);

        Ok(ReconciliationResult {
            missing,
            conflicts: merged.conflicts,
            platform,
            scan,
        })
    }

    /// Scanner additions pass the same visibility filter as dependency
    /// features. Planned features are visible already.
    fn keep_visible_additions(
        &self,
        merged: FeatureSet,
        planned: &FeatureSet,
        all_visible: &FeatureSet,
    ) -> FeatureSet {
        let additions: FeatureSet = merged.difference(planned).cloned().collect();
        let visible = visible_features(&additions, all_visible, self.options.case);
        for hidden in additions.difference(&visible) {
            debug!(feature = %hidden, "dropping scanned feature that is not visible");
        }
        planned.union(&visible).cloned().collect()
    }

    fn run_scanner(
        &self,
        inputs: &ReconcileInputs<'_>,
        platform: PlatformLevels,
        existing: &FeatureSet,
    ) -> (FeatureSet, ScanStatus) {
        if inputs.classes_dirs.is_empty() {
            debug!("no classes directories to send to the binary scanner");
            return (FeatureSet::new(), ScanStatus::Skipped);
        }
        let request = scan_request(inputs, platform, existing, &self.options.locale);
        match self.scanner.scan(&request) {
            ScanOutcome::Recommended(features) => {
                debug!(features = ?features, "features recommended by binary scanner");
                let recommended = features.len();
                (features, ScanStatus::Completed { recommended })
            }
            ScanOutcome::Unavailable { reason } => {
                warn!(%reason, "binary scanner produced no result");
                (FeatureSet::new(), ScanStatus::Unavailable { reason })
            }
        }
    }

    /// Reconcile and hand the missing features to `writer`.
    ///
    /// The previous generated declaration is retracted first so it is not
    /// counted as existing. If the inventory cannot be read it is restored and
    /// nothing else changes. An empty result writes nothing.
    pub fn generate(
        &self,
        inputs: &ReconcileInputs<'_>,
        writer: &mut dyn DeclarationWriter,
    ) -> Result<GenerationOutcome, ReconcileError> {
        writer
            .retract_previous()
            .map_err(ReconcileError::Declaration)?;

        let result = match self.reconcile(inputs) {
            Ok(r) => r,
            Err(e) => {
                if let Err(restore) = writer.restore_previous() {
                    warn!(error = %restore, "could not restore previous generated features");
                }
                error!("{e}");
                return Err(e);
            }
        };

        if result.missing.is_empty() {
            debug!("no missing features; nothing written");
            return Ok(GenerationOutcome {
                result,
                written: None,
            });
        }

        let path = writer.write_declaration(&result.missing).map_err(|e| {
            let e = ReconcileError::Declaration(e);
            error!("{e}");
            e
        })?;
        debug!(path = %path.display(), "created generated features file");

        Ok(GenerationOutcome {
            result,
            written: Some(path),
        })
    }
}
