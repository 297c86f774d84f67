//! Authentication middleware: bearer token extraction and validation.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use voidrunner_core::models::auth::Claims;

use crate::AppState;
use crate::error::AppError;

/// Validated claims, stored in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

/// Why a request carried no usable bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    Missing,
    BadScheme,
}

impl BearerError {
    pub fn message(self) -> &'static str {
        match self {
            BearerError::Missing => "Authorization header required",
            BearerError::BadScheme => "Invalid authorization header format",
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(BearerError::Missing)?;

    header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or(BearerError::BadScheme)
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, validates it,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).map_err(|e| {
        debug!(reason = e.message(), "auth gate: no bearer token");
        AppError::Unauthorized(e.message().into())
    })?;

    let claims = state.auth.validate(token).map_err(|e| {
        debug!(error = %e, "auth gate: token rejected");
        AppError::from(e)
    })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
