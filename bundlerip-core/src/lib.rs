//! bundlerip-core
//!
//! Core data model for Unity bundle asset extraction: tagged field
//! values, asset records, the bundle session model, and the error
//! taxonomy shared across the pipeline crates.

pub mod asset;
pub mod bundle;
pub mod error;
pub mod field_value;
pub mod kind;

// Re-export main types
pub use asset::Asset;
pub use bundle::{Bundle, DependencyEdge};
pub use error::{ExtractError, Result};
pub use field_value::{BYTES_KEY, FieldTree, FieldValue};
pub use kind::AssetKind;
