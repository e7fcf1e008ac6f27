//! HTTP routes.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use finproxy::{FinancialsResponse, FinancialsService, RawParams};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Read-through financials service.
    pub service: FinancialsService,
}

impl AppState {
    /// Wrap a service.
    #[must_use]
    pub const fn new(service: FinancialsService) -> Self {
        Self { service }
    }
}

/// Liveness probe body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    /// Fixed greeting.
    pub message: String,
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/financials", get(get_financials))
        .route("/api/hello", get(hello))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/financials`
async fn get_financials(
    State(state): State<AppState>,
    Query(params): Query<RawParams>,
) -> Result<Json<FinancialsResponse>, ApiError> {
    let response = state.service.fetch_financials(&params).await?;
    Ok(Json(response))
}

/// `GET /api/hello`
async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from the server!".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use finproxy::{InMemoryStore, ProxyError, Result, UpstreamFetcher};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[derive(Debug)]
    struct StubFetcher {
        response: std::result::Result<Value, u16>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UpstreamFetcher for StubFetcher {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch(&self, query: &finproxy::Query) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(payload) => {
                    let mut payload = payload.clone();
                    payload["ticker"] = json!(query.ticker.as_str());
                    Ok(payload)
                }
                Err(status) => Err(ProxyError::UpstreamStatus {
                    status: *status,
                    body: "upstream says no".to_string(),
                }),
            }
        }
    }

    fn app(response: std::result::Result<Value, u16>) -> (Router, Arc<StubFetcher>) {
        let fetcher = Arc::new(StubFetcher {
            response,
            calls: AtomicUsize::new(0),
        });
        let service = FinancialsService::new(Arc::new(InMemoryStore::new()), fetcher.clone());
        (create_router(AppState::new(service)), fetcher)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_hello() {
        let (app, _) = app(Ok(json!({})));
        let (status, body) = get_json(&app, "/api/hello").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Hello from the server!" }));
    }

    #[tokio::test]
    async fn test_financials_miss_then_hit() {
        let (app, fetcher) = app(Ok(json!({ "status": "OK", "results": [] })));

        let (status, body) = get_json(&app, "/api/financials?ticker=msft").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "OK", "results": [], "ticker": "MSFT", "fromCache": false })
        );

        let (status, body) =
            get_json(&app, "/api/financials?ticker=MSFT&limit=100&order=asc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fromCache"], json!(true));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_ticker_is_bad_request() {
        let (app, fetcher) = app(Ok(json!({})));
        let (status, body) = get_json(&app, "/api/financials?timeframe=annual").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "ticker is required" }));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_order_uses_default() {
        let (app, fetcher) = app(Ok(json!({ "status": "OK" })));

        let (status, body) = get_json(&app, "/api/financials?ticker=AAPL&order=sideways").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fromCache"], json!(false));

        let (status, body) = get_json(&app, "/api/financials?ticker=AAPL&order=asc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fromCache"], json!(true));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (app, _) = app(Err(503));
        let (status, body) = get_json(&app, "/api/financials?ticker=AAPL").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], json!("Failed to fetch financial data"));
        assert_eq!(
            body["details"],
            json!("Upstream returned 503: upstream says no")
        );
    }
}
