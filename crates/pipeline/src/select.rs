//! Top-K selection over merged assets.

use catalog::Asset;

/// Rank `assets` by relevance, highest first, and return the
/// `[offset, offset + limit)` window.
///
/// The sort is stable, so equal scores keep their incoming (first-seen)
/// order. Windows past the end yield a short or empty page.
pub fn select(mut assets: Vec<Asset>, offset: usize, limit: usize) -> Vec<Asset> {
    assets.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    assets.into_iter().skip(offset).take(limit).collect()
}
