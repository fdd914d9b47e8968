//! HTTP routes.
//!
//! - `GET /recommend?q=&type=&categories=&source=&offset=&limit=`
//! - `GET /health`
//!
//! Every response wraps its payload as `{"data": ...}`; failures add
//! `error` and `code`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use catalog::{AssetType, SearchQuery, SourceType};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::MISSING_TYPE_IN_REQUEST;
use crate::service::{RecommendationPage, RecommendationService};

/// Query string of `GET /recommend`
#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    #[serde(default)]
    pub q: String,
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    /// Comma-separated category ids
    pub categories: Option<String>,
    pub source: Option<SourceType>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u32>,
}

fn success<T: Serialize>(data: T) -> Response {
    Json(Envelope {
        data,
        error: None,
        code: None,
    })
    .into_response()
}

fn failure<T: Serialize>(status: StatusCode, data: T, message: String, code: u32) -> Response {
    let body = Envelope {
        data,
        error: Some(message),
        code: Some(code),
    };
    (status, Json(body)).into_response()
}

pub fn router(service: Arc<RecommendationService>) -> Router {
    Router::new()
        .route("/recommend", get(recommend))
        .route("/health", get(health))
        .with_state(service)
}

/// Serve the router on `listener` until the future is dropped or the
/// server fails.
pub async fn serve(listener: TcpListener, service: Arc<RecommendationService>) -> std::io::Result<()> {
    if let Ok(address) = listener.local_addr() {
        info!("Listening on {}", address);
    }
    axum::serve(listener, router(service)).await
}

async fn recommend(
    State(service): State<Arc<RecommendationService>>,
    Query(params): Query<RecommendParams>,
) -> Response {
    info!(
        "Recommending assets with q={:?}, type={:?}, source={:?}",
        params.q, params.asset_type, params.source
    );

    let Some(asset_type) = params.asset_type else {
        let message = format!(
            "Missing type in the request. Consider using type={{{}}}",
            AssetType::ALL
                .iter()
                .map(AssetType::as_str)
                .collect::<Vec<_>>()
                .join("/")
        );
        error!("{}", message);
        return failure(StatusCode::BAD_REQUEST, json!({}), message, MISSING_TYPE_IN_REQUEST);
    };

    let query = SearchQuery::build(
        params.q,
        Some(asset_type),
        params.source,
        params.categories.as_deref(),
    );
    let offset = params.offset.unwrap_or(0);
    let limit = params
        .limit
        .unwrap_or(service.config().recommend.default_limit);

    match service.recommend(&query, offset, limit).await {
        Ok(page) => success(page),
        Err(e) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            RecommendationPage::empty(),
            e.to_string(),
            e.code(),
        ),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
