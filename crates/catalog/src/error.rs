//! Error types for the catalog crate.
//!
//! These errors come from turning loosely typed input (query parameters,
//! CLI arguments) into the catalog's enums.

use thiserror::Error;

/// Errors that can occur when parsing catalog values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The value is not one of the known asset types
    #[error("Unknown asset type: {0} (expected dataset/model/paper/application/other)")]
    UnknownAssetType(String),

    /// The value is not one of the known asset sources
    #[error("Unknown asset source: {0} (expected user/external)")]
    UnknownSourceType(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
