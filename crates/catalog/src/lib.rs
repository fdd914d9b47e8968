//! # Catalog Crate
//!
//! Shared data model for the recommendation engine.
//!
//! ## Main Components
//!
//! - **types**: Assets, scored collections, search queries and sort clauses
//! - **error**: Errors raised when parsing catalog enums
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{Asset, AssetType, SearchQuery, ScoredCollection};
//!
//! let query = SearchQuery::new("sea ice").with_type(AssetType::Dataset);
//! let collection = ScoredCollection::new(vec![Asset::new("a-1", "Arctic extent")]);
//! ```

// Public modules
pub mod error;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use types::{
    // Type aliases and metric names
    AssetId,
    DOWNLOADS_COUNT,
    LIKES_COUNT,
    // Core types
    Asset,
    MetadataValue,
    ScoredCollection,
    SearchQuery,
    SortQuery,
    // Enums
    AssetType,
    SortOrder,
    SourceType,
};
