//! # Recommendation Service
//!
//! Coordinates one recommendation request:
//! 1. Build the filter registry for the query
//! 2. Run every filter concurrently and merge by asset identity
//! 3. Rank the merged assets and cut the requested page

use std::sync::Arc;
use std::time::Instant;

use catalog::{Asset, SearchQuery};
use pipeline::{Aggregator, FilterContext, FilterRegistry, select};
use serde::Serialize;
use tracing::{error, info, instrument};
use transport::{HttpTransport, Transport, TransportError};

use crate::config::AppConfig;
use crate::error::RecommendError;

/// One page of ranked assets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationPage {
    /// Number of distinct assets before paging
    #[serde(rename = "count")]
    pub total: usize,
    pub assets: Vec<Asset>,
}

impl RecommendationPage {
    pub fn empty() -> Self {
        Self {
            total: 0,
            assets: Vec::new(),
        }
    }
}

/// Entry point for recommendations, shared by every request.
#[derive(Clone)]
pub struct RecommendationService {
    config: Arc<AppConfig>,
    transport: Arc<dyn Transport>,
    aggregator: Aggregator,
}

impl RecommendationService {
    /// Create a service sending requests over HTTP.
    ///
    /// The HTTP client's own timeout matches the per-filter timeout.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.filter_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: Arc<AppConfig>, transport: Arc<dyn Transport>) -> Self {
        let aggregator = Aggregator::new(config.filter_timeout());
        Self {
            config,
            transport,
            aggregator,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Recommend assets for `query`, returning the `[offset, offset + limit)`
    /// window of the ranked list.
    ///
    /// Failing scoring sources shrink the result instead of failing it.
    ///
    /// # Errors
    /// [`RecommendError::Misconfigured`] when the filters cannot be built.
    #[instrument(skip(self, query), fields(q = %query.text))]
    pub async fn recommend(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<RecommendationPage, RecommendError> {
        let start = Instant::now();

        let context = FilterContext::new(self.config.as_ref(), self.transport.clone())
            .with_per_criterion_limit(self.config.recommend.per_criterion_limit);
        let registry = FilterRegistry::for_query(query, &context).map_err(|e| {
            error!("Failed to build filters for recommendations: {}", e);
            RecommendError::from(e)
        })?;

        let merged = self.aggregator.apply_all(&registry).await;
        let total = merged.len();
        let assets = select(merged.into_assets(), offset, limit);

        info!(
            "Recommended {} of {} assets (offset {}, limit {}) in {:.2?}",
            assets.len(),
            total,
            offset,
            limit,
            start.elapsed()
        );
        Ok(RecommendationPage { total, assets })
    }
}
