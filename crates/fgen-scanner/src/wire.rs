//! Scanner wire format.
//!
//! The request is the engine's [`ScanRequest`](fgen_reconcile::ScanRequest)
//! serialized as JSON on the scanner's stdin. The response on stdout is either
//! `{"features": [...]}` or a bare JSON array of feature ids. Unknown fields
//! are ignored.

use serde::Deserialize;

use fgen_reconcile::FeatureSet;

/// Raw scanner stdout.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawScanResponse {
    Wrapped { features: Vec<String> },
    Bare(Vec<String>),
}

impl RawScanResponse {
    fn into_entries(self) -> Vec<String> {
        match self {
            RawScanResponse::Wrapped { features } => features,
            RawScanResponse::Bare(features) => features,
        }
    }
}

/// Trim entries and drop blanks. Duplicates collapse.
pub fn normalize(raw: RawScanResponse) -> FeatureSet {
    raw.into_entries()
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Decode scanner stdout into a feature set.
pub fn decode_response(stdout: &[u8]) -> Result<FeatureSet, serde_json::Error> {
    let raw: RawScanResponse = serde_json::from_slice(stdout)?;
    Ok(normalize(raw))
}
