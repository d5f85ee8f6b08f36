/*
 * Responsibility
 * - Config読み込み → 依存生成 (DB pool / AuthService / Forwarder) → Router 組み立て
 * - Middleware の適用 (Bearer は v1 routes 側, CORS/Security headers/HTTP はここ)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::PgDirectory,
    services::{auth::build_auth_service, forward::Forwarder},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG=info,flipdocs_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development では即クラッシュさせて気づけるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let directory = Arc::new(PgDirectory::new(pool));
    let auth = build_auth_service(config);
    let forwarder =
        Forwarder::new(config.forward_timeout).context("failed to build HTTP client")?;

    Ok(AppState::new(directory, auth, forwarder))
}

/// v1 routes only, without the outer transport layers.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state)
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api_router(state);
    let router = middleware::cors::apply(router, config.app_env, &config.cors_allowed_origins);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, config.request_timeout)
}
