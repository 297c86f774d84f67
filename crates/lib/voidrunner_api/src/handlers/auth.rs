//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use tracing::debug;
use voidrunner_core::models::auth::{LoginRequest, LoginResponse, RegisterRequest, User};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::bearer_token;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(v)| v).map_err(|e| {
        debug!(error = %e, "rejected request body");
        AppError::BadRequest("Invalid request body".into())
    })
}

/// `POST /api/v1/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.auth.register(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/v1/login`: authenticate with username or email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let resp = state.auth.login(body(payload)?).await?;
    Ok(Json(resp))
}

/// `POST /api/v1/logout`: revoke the presented bearer token.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let token = bearer_token(&headers).map_err(|e| AppError::BadRequest(e.message().into()))?;
    state.auth.logout(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
