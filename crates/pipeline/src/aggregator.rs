//! Concurrent fan-out over a [`FilterRegistry`] and merge by asset identity.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::{Duration, Instant};

use catalog::{Asset, AssetId, ScoredCollection};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::registry::FilterRegistry;
use crate::traits::CriterionResults;

/// Default per-filter timeout
pub const DEFAULT_FILTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Deduplicated assets of one request, in first-seen order.
///
/// Each identity appears once. A repeated identity keeps the metadata of
/// its first instance and accumulates the relevance of every instance.
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    assets: Vec<Asset>,
    index: HashMap<AssetId, usize>,
}

impl AggregationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one normalised collection.
    pub fn merge_collection(&mut self, collection: ScoredCollection) {
        for asset in collection.assets {
            match self.index.entry(asset.id.clone()) {
                Entry::Occupied(slot) => {
                    self.assets[*slot.get()].relevance_score += asset.relevance_score;
                }
                Entry::Vacant(slot) => {
                    slot.insert(self.assets.len());
                    self.assets.push(asset);
                }
            }
        }
    }

    /// Merge every criterion of one filter's output, in criterion-name order.
    pub fn merge(&mut self, results: CriterionResults) {
        for collection in results.into_values() {
            self.merge_collection(collection);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.index.get(id).map(|&position| &self.assets[position])
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn into_assets(self) -> Vec<Asset> {
        self.assets
    }
}

/// Runs every registered filter concurrently and merges their output.
#[derive(Debug, Clone)]
pub struct Aggregator {
    filter_timeout: Duration,
}

impl Aggregator {
    pub fn new(filter_timeout: Duration) -> Self {
        Self { filter_timeout }
    }

    pub fn filter_timeout(&self) -> Duration {
        self.filter_timeout
    }

    /// Apply all filters and merge what they return.
    ///
    /// ## Algorithm
    /// 1. Start every filter's `apply()` at once, each under its own timeout
    /// 2. Wait for all of them
    /// 3. Merge successful outputs in registration order
    ///
    /// Failed or timed-out filters are logged and skipped. When every filter
    /// fails the result is empty.
    pub async fn apply_all(&self, registry: &FilterRegistry) -> AggregationResult {
        let start = Instant::now();

        let outputs = join_all(registry.iter().map(|filter| async move {
            let output = tokio::time::timeout(self.filter_timeout, filter.apply()).await;
            (filter.name(), output)
        }))
        .await;

        let mut result = AggregationResult::new();
        let mut succeeded = 0;
        for (name, output) in outputs {
            match output {
                Ok(Some(results)) => {
                    debug!("Merging {} criteria from filter '{}'", results.len(), name);
                    result.merge(results);
                    succeeded += 1;
                }
                Ok(None) => warn!("Filter '{}' produced no results", name),
                Err(_) => warn!(
                    "Filter '{}' timed out after {:?}",
                    name, self.filter_timeout
                ),
            }
        }

        info!(
            "Aggregated {} assets from {}/{} filters in {:.2?}",
            result.len(),
            succeeded,
            registry.len(),
            start.elapsed()
        );
        result
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_TIMEOUT)
    }
}
