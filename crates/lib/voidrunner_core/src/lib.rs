//! # voidrunner_core
//!
//! Credential and session-authority core for Voidrunner: password hashing,
//! bearer token issuance and revocation, and the register/login/logout flows
//! over a pluggable credential store.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
