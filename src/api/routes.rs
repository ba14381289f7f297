// src/api/routes.rs

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::api::admission::client_key;
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::core::models::AssessmentReport;
use crate::core::scanner::run_assessment;

// ---------------------------------------------------------------------------
// POST /api/assess — run one full assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub url: String,
}

pub async fn assess(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AssessRequest>,
) -> Result<Json<AssessmentReport>, ApiError> {
    let key = client_key(&headers);
    if !state.admission.try_admit(&key) {
        return Err(ApiError::QuotaExceeded);
    }

    info!(client = %key, "assessment requested");
    let report = run_assessment(&req.url, &state.config).await?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
