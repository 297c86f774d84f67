//! Handlers for the authenticated user.

use axum::extract::State;
use axum::{Extension, Json};
use voidrunner_core::models::auth::User;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;

/// `GET /api/v1/me`: the user behind the presented token.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<User>> {
    let user = state
        .auth
        .current_user(&claims)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(user))
}
