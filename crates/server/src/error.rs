//! Error types for the recommendation service.

use std::path::PathBuf;

use pipeline::FilterBuildError;
use thiserror::Error;

/// Response code for a recommendation that could not be produced
pub const FAILED_TO_RECOMMEND_ASSET: u32 = 19001;

/// Response code for a request without an asset type
pub const MISSING_TYPE_IN_REQUEST: u32 = 19002;

/// Errors that abort one recommendation request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    #[error("Failed to build filters for recommendations: {0}")]
    Misconfigured(#[from] FilterBuildError),
}

impl RecommendError {
    /// Code reported to clients alongside the error message
    pub fn code(&self) -> u32 {
        match self {
            RecommendError::Misconfigured(_) => FAILED_TO_RECOMMEND_ASSET,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
