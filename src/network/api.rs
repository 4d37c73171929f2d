//! HTTP Routes
//!
//! `GET /history/{type}?page=N`, `GET /wins` and the feed upgrade, with
//! permissive CORS for the browser frontend.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::lottery::VariantRegistry;
use crate::network::protocol::{ErrorBody, HistoryParams, HistoryResponse, WinsResponse};
use crate::network::query::{self, QueryError};
use crate::network::server::FeedHub;
use crate::store::ResultStore;

/// Default history page size.
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    store: Arc<dyn ResultStore>,
    variants: Arc<VariantRegistry>,
    feed: Arc<FeedHub>,
    page_size: u32,
}

impl ApiState {
    /// Bundle the store, registry and feed for the router.
    pub fn new(
        store: Arc<dyn ResultStore>,
        variants: Arc<VariantRegistry>,
        feed: Arc<FeedHub>,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            variants,
            feed,
            page_size,
        }
    }

    /// Live feed behind the upgrade route.
    pub fn feed(&self) -> &Arc<FeedHub> {
        &self.feed
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Query failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router for the query API and the feed.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/history", get(missing_variant))
        .route("/history/", get(missing_variant))
        .route("/history/{lottery_type}", get(history))
        .route("/wins", get(wins))
        .route(state.feed.path(), get(feed))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn history(
    State(state): State<ApiState>,
    Path(lottery_type): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, QueryError> {
    let page = query::history(
        state.store.as_ref(),
        &state.variants,
        &lottery_type,
        params.page_number(),
        state.page_size,
    )
    .await?;
    Ok(Json(page))
}

async fn missing_variant() -> QueryError {
    QueryError::MissingVariant
}

async fn wins(State(state): State<ApiState>) -> Result<Json<WinsResponse>, QueryError> {
    Ok(Json(query::wins(state.store.as_ref()).await?))
}

// Requests without `Connection: upgrade` are refused with 426 by the extractor
async fn feed(State(state): State<ApiState>, ws: WebSocketUpgrade) -> Response {
    state.feed.accept(ws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Broadcaster;
    use crate::lottery::Draw;
    use crate::network::server::ServerConfig;
    use crate::store::SqliteStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn ej(n: u32) -> Draw {
        Draw::Eurojackpot {
            numbers: vec![n, 20, 30, 40, 50],
            stars: vec![1, 2],
        }
    }

    async fn app_with(rows: u32, page_size: u32) -> Router {
        let store = SqliteStore::in_memory().await.unwrap();
        for i in 0..rows {
            let score = if i == 0 { 1.0 } else { 2.0 / 7.0 };
            store.append("eurojackpot", &ej(i + 1), &[ej(i + 1)], score).await.unwrap();
        }
        let feed = FeedHub::new(&ServerConfig::default(), Arc::new(Broadcaster::default()));
        router(ApiState::new(
            Arc::new(store),
            Arc::new(VariantRegistry::builtin()),
            Arc::new(feed),
            page_size,
        ))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_history_page() {
        let app = app_with(5, 2).await;
        let (status, body) = get_json(app, "/history/eurojackpot?page=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 5);
        let ids: Vec<i64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(body["data"][0]["lottery_type"], "eurojackpot");
        assert_eq!(body["data"][0]["draw"]["type"], "eurojackpot");
    }

    #[tokio::test]
    async fn test_history_bad_page_defaults_to_first() {
        let app = app_with(3, 24).await;
        let (status, body) = get_json(app, "/history/eurojackpot?page=banana").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"][0]["id"], 3);
    }

    #[tokio::test]
    async fn test_history_empty_variant_is_ok() {
        let app = app_with(3, 24).await;
        let (status, body) = get_json(app, "/history/powerball").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_history_unknown_variant() {
        let app = app_with(0, 24).await;
        let (status, body) = get_json(app, "/history/lotto").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("lotto"));
    }

    #[tokio::test]
    async fn test_history_missing_variant() {
        let (status, _) = get_json(app_with(0, 24).await, "/history").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app_with(0, 24).await, "/history/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wins() {
        let (status, body) = get_json(app_with(4, 24).await, "/wins").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "wins": 1 }));
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let app = app_with(0, 24).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/wins")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_feed_requires_upgrade() {
        let app = app_with(0, 24).await;
        let response = app
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = get_json(app_with(0, 24).await, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
