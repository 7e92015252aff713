/*
 * Responsibility
 * - Config → services → Router
 * - Middleware order: auth (inner) → http layers (outer)
 * - axum::serve()
 */
use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::auth::build_auth_service;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,jwks_auth_demo=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::load()?;

    let auth = build_auth_service(&config)?;
    tracing::info!(
        addr = %config.addr,
        jwks_url = %config.jwks_url,
        issuer = auth.issuer(),
        audience = auth.audience(),
        "starting server"
    );

    let app = build_router(AppState::new(auth), &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes();
    let router = middleware::auth::access::apply(router, state.clone());
    let router = router.with_state(state);

    middleware::http::apply(router, config)
}
