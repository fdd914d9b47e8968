//! Server crate for the asset recommendation engine.
//!
//! This crate wires the scoring pipeline to its collaborators: the TOML
//! configuration, the HTTP transport and the axum routes.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;

pub use config::{AppConfig, RecommendConfig, ServerConfig, ServiceEndpoint};
pub use error::{ConfigError, FAILED_TO_RECOMMEND_ASSET, MISSING_TYPE_IN_REQUEST, RecommendError};
pub use routes::{router, serve};
pub use service::{RecommendationPage, RecommendationService};
