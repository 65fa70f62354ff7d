//! fgen-server
//!
//! File-backed collaborators for a server installation:
//! - [`ServerXmlInventory`] reads declared features from `server.xml` and dropins
//! - [`ManifestCatalog`] / [`ListCatalog`] list the publicly visible features
//! - [`DropinWriter`] writes the generated override file and marks `server.xml`

pub mod catalog;
pub mod inventory;
pub mod writer;
pub mod xml_text;

pub use catalog::{ListCatalog, ManifestCatalog};
pub use inventory::{FeaturePattern, ServerXmlInventory};
pub use writer::{DropinWriter, FEATURES_FILE_MESSAGE, GENERATED_FEATURES_FILE, OVERRIDES_DIR};
