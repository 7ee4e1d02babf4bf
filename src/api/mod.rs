//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` and the
//! `/ws` feed sit at the root.

pub mod auth;
pub mod dto;
pub mod handlers;
pub mod openapi;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the servable application: REST routes, the `/ws` feed, the
/// Swagger UI (with the `swagger-ui` feature) and the HTTP middleware.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router().route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{EventBus, Ledger};
    use crate::service::UsdRate;

    fn app() -> Router {
        let Ok(rate) = UsdRate::new(2000.0) else {
            panic!("rate rejected");
        };
        let state = AppState::new(Arc::new(Ledger::new()), EventBus::new(16), rate, 30.0);
        build_app(state, Duration::from_secs(5))
    }

    async fn call(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let Ok(response) = app().oneshot(request).await;
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("unreadable body");
        };
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn request(method: Method, uri: &str, body: Body) -> Request<Body> {
        let Ok(request) = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
        else {
            panic!("bad request");
        };
        request
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = call(request(Method::GET, "/health", Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn mutations_without_identity_are_unauthorized() {
        let body = Body::from(r#"{"name":"Milo","species":"cat"}"#);
        let (status, body) = call(request(Method::POST, "/api/v1/adoptions", body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 1401);
    }

    #[tokio::test]
    async fn registration_validates_email() {
        let body = Body::from(r#"{"role":"donor","name":"Ana","email":"not-an-email"}"#);
        let (status, _) = call(request(Method::POST, "/api/v1/users", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_case_is_not_found() {
        let uri = format!("/api/v1/cases/{}", uuid::Uuid::new_v4());
        let (status, body) = call(request(Method::GET, &uri, Body::empty())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn public_listings_are_paginated() {
        let (status, body) = call(request(
            Method::GET,
            "/api/v1/adoptions?page=1&per_page=10",
            Body::empty(),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 0);
    }
}
