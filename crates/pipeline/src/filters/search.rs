//! Filter scoring assets through the search service.
//!
//! The search service exposes a multi-search API, so one request carries
//! every sub-criterion: each sub-criterion becomes a named query with its
//! own sort order, and the response holds one ranked list per name.

use std::sync::Arc;

use async_trait::async_trait;
use catalog::{DOWNLOADS_COUNT, LIKES_COUNT, SearchQuery, SortQuery};
use serde_json::{Map, Value, json};
use tracing::debug;
use transport::{OutboundRequest, Transport};

use crate::error::FilterBuildError;
use crate::normalize::normalize;
use crate::registry::FilterContext;
use crate::traits::{CriterionResults, Filter};

/// Service name looked up in the endpoint configuration
pub const SEARCH_SERVICE: &str = "search";

/// Path of the batched search API on the search service
pub const MULTI_SEARCH_PATH: &str = "multi-search";

/// Default number of assets requested per sub-criterion
pub const DEFAULT_PER_CRITERION_LIMIT: usize = 20;

fn non_negative(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// One batched query per criterion, each with its own sort order.
fn multi_search_request(
    endpoint: &str,
    criteria: &[SubCriterion],
    query: &SearchQuery,
    per_criterion_limit: usize,
) -> OutboundRequest {
    let queries: Map<String, Value> = criteria
        .iter()
        .map(|criterion| (criterion.name.clone(), json!([query, criterion.sorts])))
        .collect();

    OutboundRequest::post_json(
        endpoint,
        json!({
            "queries": queries,
            "limit": per_criterion_limit,
        }),
    )
}

/// One scoring dimension of a [`SearchFilter`].
///
/// `name` is both the key of the batched query and the metric that
/// normalises its results.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCriterion {
    pub name: String,
    pub weight: f64,
    pub sorts: Vec<SortQuery>,
}

impl SubCriterion {
    /// Negative or non-finite weights are stored as 0.
    pub fn new(name: impl Into<String>, weight: f64, sorts: Vec<SortQuery>) -> Self {
        Self {
            name: name.into(),
            weight: non_negative(weight),
            sorts,
        }
    }

    /// Most downloaded assets first
    pub fn most_downloaded() -> Self {
        Self::new(DOWNLOADS_COUNT, 2.0, vec![SortQuery::desc(DOWNLOADS_COUNT)])
    }

    /// Most liked assets first
    pub fn most_liked() -> Self {
        Self::new(LIKES_COUNT, 2.0, vec![SortQuery::desc(LIKES_COUNT)])
    }
}

/// Scores assets by popularity using a single multi-search request.
///
/// ## Algorithm
/// 1. Send one POST to `{search_host}/multi-search` holding one query per
///    sub-criterion
/// 2. Normalise each returned list on the sub-criterion's metric, weighted
///    by `sub_criterion.weight * filter.weight`
/// 3. Sub-criteria missing from the response contribute nothing; criteria
///    the filter did not ask for are dropped
pub struct SearchFilter {
    name: String,
    weight: f64,
    criteria: Vec<SubCriterion>,
    endpoint: String,
    per_criterion_limit: usize,
    query: SearchQuery,
    request: OutboundRequest,
    transport: Arc<dyn Transport>,
}

impl SearchFilter {
    pub const DEFAULT_NAME: &'static str = "Global Search Filter";

    /// Create a filter for `query` against the search service at `search_host`.
    ///
    /// Starts with the "most downloaded" and "most liked" sub-criteria and a
    /// weight of 1.0.
    pub fn new(
        search_host: &str,
        query: &SearchQuery,
        per_criterion_limit: usize,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let endpoint = format!("{}/{}", search_host.trim_end_matches('/'), MULTI_SEARCH_PATH);
        let criteria = vec![SubCriterion::most_downloaded(), SubCriterion::most_liked()];
        let request = multi_search_request(&endpoint, &criteria, query, per_criterion_limit);
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            weight: 1.0,
            criteria,
            endpoint,
            per_criterion_limit,
            query: query.clone(),
            request,
            transport,
        }
    }

    /// Resolve the search endpoint from `context` and build the filter.
    ///
    /// # Errors
    /// [`FilterBuildError::MissingEndpoint`] when no search host is configured.
    pub fn from_query(
        query: &SearchQuery,
        context: &FilterContext<'_>,
    ) -> Result<Self, FilterBuildError> {
        let host = context
            .endpoints
            .endpoint(SEARCH_SERVICE)
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| FilterBuildError::MissingEndpoint {
                service: SEARCH_SERVICE.to_string(),
            })?;

        Ok(Self::new(
            host,
            query,
            context.per_criterion_limit,
            context.transport.clone(),
        ))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = non_negative(weight);
        self
    }

    /// Replace the sub-criteria; the request is rebuilt to match.
    pub fn with_criteria(mut self, criteria: Vec<SubCriterion>) -> Self {
        self.criteria = criteria;
        self.request = self.build_request(&self.query);
        self
    }

    pub fn sub_criteria(&self) -> &[SubCriterion] {
        &self.criteria
    }
}

#[async_trait]
impl Filter for SearchFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn build_request(&self, query: &SearchQuery) -> OutboundRequest {
        multi_search_request(&self.endpoint, &self.criteria, query, self.per_criterion_limit)
    }

    fn request(&self) -> &OutboundRequest {
        &self.request
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn normalize_results(&self, mut results: CriterionResults) -> CriterionResults {
        let mut normalized = CriterionResults::new();
        for criterion in &self.criteria {
            let Some(collection) = results.remove(&criterion.name) else {
                debug!(
                    "Filter '{}' got no results for criterion '{}'",
                    self.name, criterion.name
                );
                continue;
            };
            let weight = criterion.weight * self.weight;
            normalized.insert(
                criterion.name.clone(),
                normalize(&criterion.name, weight, collection),
            );
        }

        if !results.is_empty() {
            debug!(
                "Filter '{}' ignored undeclared criteria: {:?}",
                self.name,
                results.keys().collect::<Vec<_>>()
            );
        }
        normalized
    }
}
