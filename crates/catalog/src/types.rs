//! Core domain types for the asset catalog.
//!
//! This module defines the data structures exchanged with the search
//! service and passed through the recommendation pipeline. The serde
//! attributes pin the wire names used by the search service
//! (`documentType`, `categoryId`, `r_score`, ...).

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

// =============================================================================
// Type Aliases and Metric Names
// =============================================================================

/// Unique identifier for a catalog item
pub type AssetId = String;

/// Metric key for the number of likes an asset received
pub const LIKES_COUNT: &str = "likes_count";

/// Metric key for the number of downloads an asset received
pub const DOWNLOADS_COUNT: &str = "downloads_count";

/// Wire value used by the search service when the download count is unknown
const UNKNOWN_COUNT: i64 = -1;

fn unknown_count() -> i64 {
    UNKNOWN_COUNT
}

/// Layouts accepted for timestamps sent without an offset
const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a wire timestamp. Values without an offset are read as UTC.
fn parse_wire_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = raw.parse::<DateTime<FixedOffset>>() {
        return Some(date.with_timezone(&Utc));
    }
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_wire_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

// =============================================================================
// Enums
// =============================================================================

/// Kind of catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Dataset,
    Model,
    Paper,
    Application,
    Other,
}

impl AssetType {
    pub const ALL: [AssetType; 5] = [
        AssetType::Dataset,
        AssetType::Model,
        AssetType::Paper,
        AssetType::Application,
        AssetType::Other,
    ];

    /// Wire representation of this asset type
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Dataset => "dataset",
            AssetType::Model => "model",
            AssetType::Paper => "paper",
            AssetType::Application => "application",
            AssetType::Other => "other",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dataset" => Ok(AssetType::Dataset),
            "model" => Ok(AssetType::Model),
            "paper" => Ok(AssetType::Paper),
            "application" => Ok(AssetType::Application),
            "other" => Ok(AssetType::Other),
            _ => Err(CatalogError::UnknownAssetType(s.to_string())),
        }
    }
}

/// Where an asset was contributed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    User,
    External,
}

impl SourceType {
    /// Wire representation of this source
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::User => "user",
            SourceType::External => "external",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(SourceType::User),
            "external" => Ok(SourceType::External),
            _ => Err(CatalogError::UnknownSourceType(s.to_string())),
        }
    }
}

/// Direction of a sort clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

// =============================================================================
// Assets
// =============================================================================

/// A catalog item as returned by the search service, carrying the
/// relevance score accumulated during one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    #[serde(rename = "documentType")]
    pub document_type: AssetType,
    pub name: String,
    /// Free-form metadata attached by the asset owner
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Offsets are optional on input; naive timestamps are UTC
    #[serde(deserialize_with = "deserialize_wire_date")]
    pub date: DateTime<Utc>,
    /// Text-match score from the search service
    #[serde(default)]
    pub score: f64,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    #[serde(default)]
    pub source: SourceType,
    pub likes_count: i64,
    /// `-1` when the search service does not know the count
    #[serde(default = "unknown_count")]
    pub downloads_count: i64,
    /// Relevance accumulated by the pipeline. Starts at 0.0 and only grows.
    #[serde(rename = "r_score", default)]
    pub relevance_score: f64,
}

impl Asset {
    /// Create an asset with empty metadata and zeroed metrics.
    pub fn new(id: impl Into<AssetId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document_type: AssetType::Other,
            name: name.into(),
            metadata: BTreeMap::new(),
            date: DateTime::<Utc>::default(),
            score: 0.0,
            category_id: String::new(),
            source: SourceType::default(),
            likes_count: 0,
            downloads_count: 0,
            relevance_score: 0.0,
        }
    }

    /// Set the asset type (builder pattern)
    pub fn with_type(mut self, document_type: AssetType) -> Self {
        self.document_type = document_type;
        self
    }

    /// Set the like count (builder pattern)
    pub fn with_likes(mut self, likes: i64) -> Self {
        self.likes_count = likes;
        self
    }

    /// Set the download count (builder pattern)
    pub fn with_downloads(mut self, downloads: i64) -> Self {
        self.downloads_count = downloads;
        self
    }

    /// Raw popularity metric named `metric`.
    ///
    /// Unknown metric names yield 0. Negative values (the "unknown"
    /// sentinel) are clamped to 0 so they never lower a score.
    pub fn metric(&self, metric: &str) -> f64 {
        let raw = match metric {
            LIKES_COUNT => self.likes_count,
            DOWNLOADS_COUNT => self.downloads_count,
            _ => 0,
        };
        raw.max(0) as f64
    }
}

/// An ordered list of assets plus the number of matches the producer saw.
///
/// `count` may be larger than `assets.len()` when the producer truncated
/// its result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireCollection")]
pub struct ScoredCollection {
    pub count: usize,
    pub assets: Vec<Asset>,
}

/// Wire form of [`ScoredCollection`]; `count` is optional on input.
#[derive(Deserialize)]
struct WireCollection {
    count: Option<usize>,
    assets: Vec<Asset>,
}

impl From<WireCollection> for ScoredCollection {
    fn from(wire: WireCollection) -> Self {
        let count = wire.count.unwrap_or(wire.assets.len());
        Self {
            count,
            assets: wire.assets,
        }
    }
}

impl ScoredCollection {
    /// Create a collection whose count is the number of assets
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            count: assets.len(),
            assets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }
}

// =============================================================================
// Queries
// =============================================================================

/// A metadata filter value: the search service accepts ints or strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Int(i64),
    Text(String),
}

/// Search criteria forwarded to scoring sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(rename = "documentType")]
    pub document_type: Option<AssetType>,
    #[serde(rename = "documentSource")]
    pub document_source: Option<SourceType>,
    #[serde(rename = "documentCategory")]
    pub document_category: Option<Vec<String>>,
    pub metadatas: Option<BTreeMap<String, MetadataValue>>,
}

impl SearchQuery {
    /// Create a free-text query with no other criteria
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Build a query from request-style arguments.
    ///
    /// `categories` is a comma-separated list; an empty or missing value
    /// means "any category".
    pub fn build(
        text: impl Into<String>,
        document_type: Option<AssetType>,
        document_source: Option<SourceType>,
        categories: Option<&str>,
    ) -> Self {
        let document_category = categories
            .filter(|raw| !raw.is_empty())
            .map(|raw| raw.split(',').map(|c| c.trim().to_string()).collect());

        Self {
            text: text.into(),
            document_type,
            document_source,
            document_category,
            metadatas: None,
        }
    }

    pub fn with_type(mut self, document_type: AssetType) -> Self {
        self.document_type = Some(document_type);
        self
    }
}

/// One sort clause of a search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortQuery {
    pub field: String,
    pub order: SortOrder,
}

impl SortQuery {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Sort by `field`, highest first
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}
