//! Error types for building and running filters.

use thiserror::Error;

/// Errors that prevent the filter set from being built at all.
///
/// These are the only failures allowed to abort a recommendation request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterBuildError {
    #[error("Missing endpoint for the '{service}' service in configuration")]
    MissingEndpoint { service: String },
}

/// A scoring service answered, but not with something we can use.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response has no '{0}' field")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_endpoint_names_service() {
        let err = FilterBuildError::MissingEndpoint {
            service: "search".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing endpoint for the 'search' service in configuration"
        );
    }

    #[test]
    fn test_missing_field_message() {
        assert_eq!(
            ResponseError::MissingField("data").to_string(),
            "Response has no 'data' field"
        );
    }
}
