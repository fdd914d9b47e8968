//! Scoring pipeline for multi-source asset recommendations.
//!
//! This crate provides:
//! - The Filter trait: a named, weighted scoring source
//! - SearchFilter, scoring assets through the search service
//! - FilterRegistry for composing the filters of one request
//! - Aggregator, running filters concurrently and merging by asset identity
//! - Normalisation and top-K selection
//!
//! ## Architecture
//! A request flows through the pipeline in stages:
//! 1. The registry builds every filter for the query
//! 2. The aggregator runs them concurrently; each filter fetches once and
//!    normalises its ranked lists into relevance contributions
//! 3. Contributions are summed per asset
//! 4. The merged list is ranked and paged
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{Aggregator, FilterContext, FilterRegistry, select};
//!
//! let context = FilterContext::new(&endpoints, transport.clone());
//! let registry = FilterRegistry::for_query(&query, &context)?;
//!
//! let merged = Aggregator::default().apply_all(&registry).await;
//! let total = merged.len();
//! let page = select(merged.into_assets(), 0, 10);
//! ```

pub mod aggregator;
pub mod error;
pub mod filters;
pub mod normalize;
pub mod registry;
pub mod select;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export main types
pub use aggregator::{AggregationResult, Aggregator, DEFAULT_FILTER_TIMEOUT};
pub use error::{FilterBuildError, ResponseError};
pub use filters::{SearchFilter, SubCriterion};
pub use normalize::{MIN_MAX_VALUE, normalize};
pub use registry::{EndpointResolver, FilterContext, FilterRegistry};
pub use select::select;
pub use traits::{CriterionResults, Filter, decode_results};
