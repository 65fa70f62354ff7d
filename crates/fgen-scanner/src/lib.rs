//! fgen-scanner
//!
//! Binary scanner adapter. The scanner is a separately shipped executable;
//! this crate runs it, feeds it a [`ScanRequest`](fgen_reconcile::ScanRequest)
//! and decodes the recommended features. Any failure (missing executable,
//! crash, garbage output) becomes `ScanOutcome::Unavailable` so the engine can
//! carry on without recommendations.

mod process;
pub mod wire;

pub use process::{ProcessScanner, ScannerError};
