//! The FilterRegistry holds the filters taking part in one recommendation.
//!
//! A registry is built per request from the query and the endpoint
//! configuration, so no filter state outlives the request that created it.

use std::collections::HashMap;
use std::sync::Arc;

use catalog::SearchQuery;
use tracing::debug;
use transport::Transport;

use crate::error::FilterBuildError;
use crate::filters::{DEFAULT_PER_CRITERION_LIMIT, SearchFilter};
use crate::traits::Filter;

/// Looks up the base URL of a named scoring service.
pub trait EndpointResolver: Send + Sync {
    fn endpoint(&self, service: &str) -> Option<&str>;
}

impl EndpointResolver for HashMap<String, String> {
    fn endpoint(&self, service: &str) -> Option<&str> {
        self.get(service).map(String::as_str)
    }
}

/// Everything a filter needs to build itself for a query.
pub struct FilterContext<'a> {
    pub endpoints: &'a dyn EndpointResolver,
    pub transport: Arc<dyn Transport>,
    pub per_criterion_limit: usize,
}

impl<'a> FilterContext<'a> {
    pub fn new(endpoints: &'a dyn EndpointResolver, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoints,
            transport,
            per_criterion_limit: DEFAULT_PER_CRITERION_LIMIT,
        }
    }

    pub fn with_per_criterion_limit(mut self, limit: usize) -> Self {
        self.per_criterion_limit = limit;
        self
    }
}

/// Ordered set of filters for one query.
///
/// ## Usage
/// ```ignore
/// let registry = FilterRegistry::new()
///     .add_filter(SearchFilter::new(host, &query, 20, transport.clone()))
///     .add_filter(SearchFilter::new(other_host, &query, 20, transport).with_weight(0.5));
///
/// let merged = Aggregator::default().apply_all(&registry).await;
/// ```
pub struct FilterRegistry {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterRegistry {
    /// Create a new empty FilterRegistry.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Build the standard filter set for `query`.
    ///
    /// # Errors
    /// Fails when a filter cannot resolve its endpoint. Callers treat this
    /// as misconfiguration and abort the request.
    pub fn for_query(
        query: &SearchQuery,
        context: &FilterContext<'_>,
    ) -> Result<Self, FilterBuildError> {
        let registry = Self::new().add_filter(SearchFilter::from_query(query, context)?);
        debug!("Built {} filters for query '{}'", registry.len(), query.text);
        Ok(registry)
    }

    /// Add a filter to the registry (builder pattern).
    ///
    /// Registration order is the order results are merged in.
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Filter> {
        self.filters.iter().map(|filter| filter.as_ref())
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
