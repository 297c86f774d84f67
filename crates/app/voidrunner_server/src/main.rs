//! Voidrunner API server binary.
//!
//! Reads configuration from the environment (and `.env`), opens the
//! configured credential store and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use voidrunner_api::config::ApiConfig;
use voidrunner_core::auth::jwt::TokenManager;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "voidrunner_server", about = "Voidrunner API server")]
struct Args {
    /// Address to listen on. Overrides `BIND_ADDR`.
    #[arg(long)]
    bind_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,voidrunner_api=debug,voidrunner_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(addr) = args.bind_addr {
        config.bind_addr = addr;
    }

    info!(bind_addr = %config.bind_addr, "starting voidrunner_server");
    if config.core.uses_default_secret() {
        warn!("using default JWT secret; set JWT_SECRET in production");
    }

    let store = voidrunner_core::store::open_store(&config.core).await?;
    let tokens = Arc::new(TokenManager::new(
        config.core.jwt_secret.as_bytes(),
        config.core.jwt_expiration,
    ));
    info!(
        expiry_secs = tokens.expiry().num_seconds(),
        sweep_secs = config.revocation_sweep_interval.as_secs(),
        "token manager ready"
    );
    let sweeper = tokens.spawn_sweep_task(config.revocation_sweep_interval);

    let app = voidrunner_api::router(voidrunner_api::AppState::new(store, tokens));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await;

    sweeper.abort();
    result?;

    Ok(())
}
