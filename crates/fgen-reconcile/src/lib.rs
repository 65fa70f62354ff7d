//! fgen-reconcile
//!
//! Feature reconciliation engine.
//!
//! Three sources decide which server features a build must declare:
//! - feature archives among the declared dependencies,
//! - features already declared in server configuration,
//! - features recommended by the binary scanner.
//!
//! Dependency features are filtered by visibility and differenced against the
//! existing declarations; scanner recommendations only fill names nobody has
//! declared. Existing declarations always win, stricter scanner versions are
//! reported as conflicts.
//!
//! Pure set logic. I/O lives behind the traits in [`collaborators`].

pub mod collaborators;
mod engine;
pub mod extract;
pub mod feature_name;
pub mod merge;
pub mod mp_table;
pub mod platform;
mod types;

pub use collaborators::{
    DeclarationError, DeclarationWriter, FeatureInventory, FeatureScanner, InventoryError,
    NoScanner, ScanOutcome, ScanRequest, VisibleFeatureCatalog,
};
pub use engine::{
    plan_from_dependencies, FeatureReconciler, GenerationOutcome, ReconcileError,
    ReconcileInputs, ReconcileOptions,
};
pub use extract::CaseMode;
pub use feature_name::{parse_feature_name, FeatureName};
pub use merge::{merge_scan_results, ScanMerge};
pub use mp_table::mp_component_level;
pub use platform::{detect_ee_level, detect_mp_level, detect_platform};
pub use types::*;
