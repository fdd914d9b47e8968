//! Test fixtures shared by the pipeline's unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use transport::{OutboundRequest, RawResponse, Transport, TransportError};

/// Transport returning a canned answer, optionally after a delay.
pub struct StubTransport {
    answer: Result<RawResponse, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<OutboundRequest>>,
}

impl StubTransport {
    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            answer: Ok(RawResponse::new(status, body)),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::raw(status, serde_json::to_vec(&body).expect("serializable body"))
    }

    pub fn failing() -> Self {
        Self {
            answer: Err("connection refused".to_string()),
            ..Self::raw(0, "")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        self.last_request.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("lock") = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer
            .clone()
            .map_err(|reason| TransportError::RequestFailed {
                url: request.url.clone(),
                reason,
            })
    }
}

/// Wire JSON for one asset with the given popularity metrics.
pub fn asset_json(id: &str, likes: i64, downloads: i64) -> Value {
    json!({
        "id": id,
        "documentType": "dataset",
        "name": format!("Asset {id}"),
        "metadata": {},
        "date": "2024-01-15T08:30:00+00:00",
        "categoryId": "climate",
        "source": "user",
        "likes_count": likes,
        "downloads_count": downloads,
    })
}

/// Wrap `{criterion: [asset...]}` in the search service's response envelope.
pub fn results_body(criteria: Value) -> Value {
    let results: serde_json::Map<String, Value> = criteria
        .as_object()
        .expect("criteria must be an object")
        .iter()
        .map(|(name, assets)| {
            let count = assets.as_array().map_or(0, Vec::len);
            (name.clone(), json!({ "count": count, "assets": assets }))
        })
        .collect();
    json!({ "data": { "results": results } })
}
