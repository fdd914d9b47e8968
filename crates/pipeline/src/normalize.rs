//! Normalisation and ponderation of relevance scores.
//!
//! Each sub-criterion contributes to an asset's relevance in proportion to
//! the asset's metric relative to the best metric in the same result list.

use catalog::ScoredCollection;
use tracing::debug;

/// Lower bound for the divisor, so an all-zero list scores 0 instead of NaN.
pub const MIN_MAX_VALUE: f64 = 0.01;

/// Add each asset's weighted, normalised `metric` to its relevance score.
///
/// ## Algorithm
/// 1. Empty collections are returned unchanged
/// 2. `max_value = max(metric over all assets, MIN_MAX_VALUE)`
/// 3. `relevance_score += metric / max_value * weight` for every asset
///
/// Contributions land in `[0, weight]` and the asset holding the maximum
/// metric receives exactly `weight` (when that maximum is at least
/// [`MIN_MAX_VALUE`]). No asset is ever removed.
///
/// Takes ownership and hands the collection back so calls can be chained.
pub fn normalize(metric: &str, weight: f64, mut collection: ScoredCollection) -> ScoredCollection {
    if collection.is_empty() {
        return collection;
    }

    let max_value = collection
        .assets
        .iter()
        .map(|asset| asset.metric(metric))
        .fold(MIN_MAX_VALUE, f64::max);
    debug!("max value of {} for normalization: {}", metric, max_value);

    for asset in &mut collection.assets {
        asset.relevance_score += asset.metric(metric) / max_value * weight;
    }

    debug!(
        "normalized {} assets on {} with weight {}",
        collection.len(),
        metric,
        weight
    );
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Asset, DOWNLOADS_COUNT, LIKES_COUNT};

    fn liked(values: &[i64]) -> ScoredCollection {
        ScoredCollection::new(
            values
                .iter()
                .enumerate()
                .map(|(i, likes)| Asset::new(format!("a{i}"), "asset").with_likes(*likes))
                .collect(),
        )
    }

    fn scores(collection: &ScoredCollection) -> Vec<f64> {
        collection.assets.iter().map(|a| a.relevance_score).collect()
    }

    #[test]
    fn test_empty_collection_unchanged() {
        let collection = normalize(LIKES_COUNT, 2.0, ScoredCollection::default());
        assert!(collection.is_empty());
    }

    #[test]
    fn test_max_asset_receives_full_weight() {
        let collection = normalize(LIKES_COUNT, 3.0, liked(&[10, 5, 0]));
        assert_eq!(scores(&collection), vec![3.0, 1.5, 0.0]);
    }

    #[test]
    fn test_contributions_bounded_by_weight() {
        let weight = 2.5;
        let collection = normalize(LIKES_COUNT, weight, liked(&[3, 17, 8, 1, 17, 0]));

        for score in scores(&collection) {
            assert!((0.0..=weight).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn test_all_zero_metrics_score_zero() {
        let collection = normalize(LIKES_COUNT, 2.0, liked(&[0, 0, 0]));

        for score in scores(&collection) {
            assert_eq!(score, 0.0);
            assert!(!score.is_nan());
        }
    }

    #[test]
    fn test_missing_metric_counts_as_zero() {
        let collection = normalize("stars", 2.0, liked(&[4, 9]));
        assert_eq!(scores(&collection), vec![0.0, 0.0]);
    }

    #[test]
    fn test_unknown_downloads_sentinel_contributes_nothing() {
        let collection = ScoredCollection::new(vec![
            Asset::new("a", "A").with_downloads(-1),
            Asset::new("b", "B").with_downloads(4),
        ]);

        let collection = normalize(DOWNLOADS_COUNT, 2.0, collection);
        assert_eq!(scores(&collection), vec![0.0, 2.0]);
    }

    #[test]
    fn test_zero_weight_adds_nothing() {
        let collection = normalize(LIKES_COUNT, 0.0, liked(&[5, 2]));
        assert_eq!(scores(&collection), vec![0.0, 0.0]);
    }

    #[test]
    fn test_accumulates_onto_existing_score() {
        let collection = ScoredCollection::new(vec![
            Asset::new("a", "A").with_likes(10).with_downloads(1),
            Asset::new("b", "B").with_likes(1).with_downloads(10),
        ]);

        let collection = normalize(DOWNLOADS_COUNT, 2.0, normalize(LIKES_COUNT, 2.0, collection));

        for score in scores(&collection) {
            assert!((score - 2.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_count_and_order_preserved() {
        let mut input = liked(&[1, 2, 3]);
        input.count = 50;

        let collection = normalize(LIKES_COUNT, 1.0, input);
        assert_eq!(collection.count, 50);
        let ids: Vec<_> = collection.assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "a1", "a2"]);
    }
}
