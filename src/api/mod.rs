// src/api/mod.rs
//
// The inbound HTTP surface: one assessment endpoint plus a health check,
// with per-client admission control in front of the pipeline.

pub mod admission;
pub mod error;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::admission::{AdmissionPolicy, FixedWindowLimiter};
use crate::config::AppConfig;

/// Shared state handed to every handler. The admission policy is the only
/// cross-request mutable state in the whole service.
pub struct AppState {
    pub config: AppConfig,
    pub admission: Box<dyn AdmissionPolicy>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let admission = Box::new(FixedWindowLimiter::new(
            config.admission_window,
            config.admission_quota,
        ));
        Self { config, admission }
    }
}

/// Builds the axum router (also used directly by the integration tests).
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(routes::health_check))
        .route("/api/assess", post(routes::assess))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(64 * 1024)) // requests are one small URL
        .with_state(state)
}
