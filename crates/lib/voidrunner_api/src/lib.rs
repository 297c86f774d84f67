//! # voidrunner_api
//!
//! HTTP API for Voidrunner: auth endpoints and the bearer-token gate in
//! front of protected routes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use voidrunner_core::auth::jwt::TokenManager;
use voidrunner_core::auth::service::AuthService;
use voidrunner_core::store::CredentialStore;

use crate::handlers::{auth, users, welcome};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Register/login/logout flows and token validation.
    pub auth: AuthService,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenManager>) -> Self {
        Self {
            auth: AuthService::new(store, tokens),
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required). Logout reads the bearer token itself
    // so an already expired token can still be revoked.
    let public = Router::new()
        .route(routes::GET_WELCOME, get(welcome::welcome_handler))
        .route(routes::POST_REGISTER, post(auth::register_handler))
        .route(routes::POST_LOGIN, post(auth::login_handler))
        .route(routes::POST_LOGOUT, post(auth::logout_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_ME, get(users::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
