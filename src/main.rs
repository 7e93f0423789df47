//! Firstember wallet HTTP entrypoint.
//!
//! Endpoints:
//! - `GET /openai-app.json` – App manifest
//! - `GET /openapi.json` – OpenAPI document
//! - `POST /call?action=<name>` – Run a wallet action, answering with a card
//!
//! This server includes:
//! - OpenTelemetry tracing via `TraceLayer`
//! - CORS support for cross-origin hosts
//! - Per-session wallet state keyed by the `x-session-id` header
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control binding address
//! - `OTEL_*` variables enable trace export

use axum::Router;
use axum::http::Method;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors;

use firstember_wallet::actions::{Explorers, register_wallet_actions};
use firstember_wallet::config::Config;
use firstember_wallet::dispatcher::ActionDispatcher;
use firstember_wallet::gateway::WalletGateway;
use firstember_wallet::handlers::{self, AppState};
use firstember_wallet::session::SessionStore;
use firstember_wallet::util::{SigDown, Telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let telemetry = Telemetry::new();

    let config = Config::load()?;

    let gateway = Arc::new(WalletGateway::from_config(&config)?);
    let chains = gateway.chains().collect::<Vec<_>>();
    tracing::info!(?chains, mode = ?config.mode(), "Wallet gateway ready");
    let dispatcher = register_wallet_actions(
        ActionDispatcher::new(SessionStore::new()),
        gateway,
        Explorers::from_config(&config),
    );
    let actions = dispatcher.actions().collect::<Vec<_>>();
    tracing::info!(?actions, "Actions registered");
    let state = AppState::new(
        dispatcher,
        config.manifest().to_path_buf(),
        config.openapi().to_path_buf(),
    );

    let http_endpoints = Router::new()
        .merge(handlers::routes().with_state(state))
        .layer(telemetry.http_tracing())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);
    tracing::info!("Manifest: http://{}/openai-app.json", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            e
        })?;

    let sig_down = SigDown::try_new()?;
    let axum_cancellation_token = sig_down.cancellation_token();
    let axum_graceful_shutdown = async move { axum_cancellation_token.cancelled().await };
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(axum_graceful_shutdown)
        .await?;

    Ok(())
}
