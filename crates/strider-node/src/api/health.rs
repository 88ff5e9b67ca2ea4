//! Health check endpoint.

use axum::Json;
use serde::Serialize;
use strider_heuristics::HeuristicName;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Heuristics a solve request may select.
    pub heuristics: Vec<&'static str>,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        heuristics: HeuristicName::ALL
            .iter()
            .filter(|name| name.is_supported())
            .map(|name| name.as_str())
            .collect(),
    })
}
