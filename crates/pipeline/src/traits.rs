//! Core traits for the scoring pipeline.
//!
//! This module defines the Filter trait: a named, weighted scoring source
//! that fetches ranked assets from a remote service and turns them into
//! relevance contributions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use catalog::{ScoredCollection, SearchQuery};
use serde::Deserialize;
use tracing::{debug, warn};
use transport::{OutboundRequest, Transport};

use crate::error::ResponseError;
use crate::normalize::normalize;

/// Normalised result lists keyed by sub-criterion name.
pub type CriterionResults = BTreeMap<String, ScoredCollection>;

/// Core trait for scoring sources.
///
/// All filters must implement this trait to be registered in a
/// [`FilterRegistry`](crate::FilterRegistry).
///
/// ## Design Note
/// - `Send + Sync` lets the aggregator poll every filter concurrently
/// - A filter builds its request once, at construction, from the query
/// - `apply` never fails loudly: every failure becomes `None` plus a log line
#[async_trait]
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Overall weight of this filter's contributions (always >= 0)
    fn weight(&self) -> f64;

    /// Describe the request this filter sends for `query`.
    ///
    /// Pure: performs no I/O and returns the same request for the same query.
    fn build_request(&self, query: &SearchQuery) -> OutboundRequest;

    /// The request built for the current query
    fn request(&self) -> &OutboundRequest;

    /// The transport used to send [`Filter::request`]
    fn transport(&self) -> &dyn Transport;

    /// Decode a successful response body into per-criterion result lists.
    ///
    /// The default expects the `{"data": {"results": {...}}}` envelope
    /// shared by the catalog services.
    fn parse_response(&self, body: &[u8]) -> Result<CriterionResults, ResponseError> {
        decode_results(body)
    }

    /// Normalise every criterion of a decoded response.
    ///
    /// The default normalises each returned criterion on the metric of the
    /// same name, using the filter's own weight.
    fn normalize_results(&self, results: CriterionResults) -> CriterionResults {
        results
            .into_iter()
            .map(|(criterion, collection)| {
                let collection = normalize(&criterion, self.weight(), collection);
                (criterion, collection)
            })
            .collect()
    }

    /// Fetch, validate and normalise this filter's results.
    ///
    /// Sends exactly one request. Returns `None` on transport errors,
    /// statuses >= 300 and malformed payloads.
    async fn apply(&self) -> Option<CriterionResults> {
        let request = self.request();
        let response = match self.transport().send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Filter '{}' could not reach {}: {}", self.name(), request.url, e);
                return None;
            }
        };

        if !response.is_success() {
            warn!("Filter '{}' returned status {}", self.name(), response.status);
            return None;
        }

        let results = match self.parse_response(&response.body) {
            Ok(results) => results,
            Err(e) => {
                warn!("Failed to parse response for filter '{}': {}", self.name(), e);
                return None;
            }
        };
        debug!(
            "Filter '{}' returned {} criteria",
            self.name(),
            results.len()
        );

        Some(self.normalize_results(results))
    }
}

#[derive(Deserialize)]
struct Envelope {
    data: Option<ResultsPayload>,
}

#[derive(Deserialize)]
struct ResultsPayload {
    results: CriterionResults,
}

/// Decode the `{"data": {"results": {...}}}` envelope.
pub fn decode_results(body: &[u8]) -> Result<CriterionResults, ResponseError> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    let payload = envelope.data.ok_or(ResponseError::MissingField("data"))?;
    Ok(payload.results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubTransport, asset_json, results_body};
    use catalog::{DOWNLOADS_COUNT, LIKES_COUNT};
    use serde_json::json;

    /// Minimal filter relying on every provided method.
    struct PlainFilter {
        weight: f64,
        request: OutboundRequest,
        transport: StubTransport,
    }

    impl PlainFilter {
        fn new(weight: f64, transport: StubTransport) -> Self {
            Self {
                weight,
                request: OutboundRequest::get("http://plain/top"),
                transport,
            }
        }
    }

    #[async_trait]
    impl Filter for PlainFilter {
        fn name(&self) -> &str {
            "PlainFilter"
        }

        fn weight(&self) -> f64 {
            self.weight
        }

        fn build_request(&self, query: &SearchQuery) -> OutboundRequest {
            OutboundRequest::get("http://plain/top").with_query("q", query.text.clone())
        }

        fn request(&self) -> &OutboundRequest {
            &self.request
        }

        fn transport(&self) -> &dyn Transport {
            &self.transport
        }
    }

    fn two_criteria_body() -> serde_json::Value {
        results_body(json!({
            LIKES_COUNT: [asset_json("a", 10, 1), asset_json("b", 5, 2)],
            DOWNLOADS_COUNT: [asset_json("b", 5, 2), asset_json("c", 0, 8)],
        }))
    }

    #[test]
    fn test_decode_results_envelope() {
        let body = serde_json::to_vec(&two_criteria_body()).unwrap();
        let results = decode_results(&body).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[LIKES_COUNT].len(), 2);
    }

    #[test]
    fn test_decode_mixed_timestamp_layouts() {
        let mut naive = asset_json("b", 2, 4);
        naive["date"] = json!("2024-01-15T08:30:00.250");
        let body = results_body(json!({LIKES_COUNT: [asset_json("a", 5, 1), naive]}));

        let results = decode_results(&serde_json::to_vec(&body).unwrap()).unwrap();

        let dates: Vec<String> = results[LIKES_COUNT]
            .assets
            .iter()
            .map(|a| a.date.to_rfc3339())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-01-15T08:30:00+00:00", "2024-01-15T08:30:00.250+00:00"]
        );
    }

    #[test]
    fn test_decode_rejects_missing_data() {
        let err = decode_results(br#"{"results": {}}"#).unwrap_err();
        assert!(matches!(err, ResponseError::MissingField("data")));

        let err = decode_results(b"not json").unwrap_err();
        assert!(matches!(err, ResponseError::Malformed(_)));

        let err = decode_results(br#"{"data": {"hits": []}}"#).unwrap_err();
        assert!(matches!(err, ResponseError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_apply_normalizes_every_criterion_with_filter_weight() {
        let filter = PlainFilter::new(1.5, StubTransport::json(200, two_criteria_body()));

        let results = filter.apply().await.expect("filter should succeed");

        let likes: Vec<f64> = results[LIKES_COUNT].assets.iter().map(|a| a.relevance_score).collect();
        assert_eq!(likes, vec![1.5, 0.75]);
        let downloads: Vec<f64> =
            results[DOWNLOADS_COUNT].assets.iter().map(|a| a.relevance_score).collect();
        assert_eq!(downloads, vec![0.375, 1.5]);
        assert_eq!(filter.transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_apply_error_status_is_none() {
        let filter = PlainFilter::new(1.0, StubTransport::json(500, two_criteria_body()));
        assert!(filter.apply().await.is_none());

        let filter = PlainFilter::new(1.0, StubTransport::json(301, two_criteria_body()));
        assert!(filter.apply().await.is_none());
    }

    #[tokio::test]
    async fn test_apply_transport_failure_is_none() {
        let filter = PlainFilter::new(1.0, StubTransport::failing());
        assert!(filter.apply().await.is_none());
    }

    #[tokio::test]
    async fn test_apply_malformed_body_is_none() {
        let filter = PlainFilter::new(1.0, StubTransport::raw(200, "<html>oops</html>"));
        assert!(filter.apply().await.is_none());
    }

    #[test]
    fn test_build_request_is_deterministic() {
        let filter = PlainFilter::new(1.0, StubTransport::failing());
        let query = SearchQuery::new("ice");

        assert_eq!(filter.build_request(&query), filter.build_request(&query));
    }
}
