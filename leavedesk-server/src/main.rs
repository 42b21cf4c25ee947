//! leavedesk-server: HR leave & reimbursement tracking service
//!
//! Long-running HTTP service that:
//! - Authenticates users with JWT (argon2-hashed credentials)
//! - Manages the leave request lifecycle and per-user leave balances
//! - Manages reimbursement claims
//! - Serves reporting endpoints (stats, admin dashboard, team calendar)

mod api;
mod auth;
mod config;
mod db;
mod ledger;
mod state;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leavedesk_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting leavedesk-server (env: {})", config.environment);

    // Initialize application state (connects + migrates)
    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("leavedesk-server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
