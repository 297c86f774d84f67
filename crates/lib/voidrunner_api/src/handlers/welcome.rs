//! Welcome endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: &'static str,
}

/// `GET /api/v1/welcome`: unauthenticated liveness check.
pub async fn welcome_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the VoidRunner API".to_string(),
        version: voidrunner_core::version(),
    })
}
