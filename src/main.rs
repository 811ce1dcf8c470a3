mod config;
mod db;
mod entities;
mod error;
mod models;
mod routes;
mod search;
mod seed;
#[cfg(test)]
mod test_support;
mod validation;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, search::MovieCatalog};

#[derive(Clone)]
pub struct AppState {
    pub catalog: MovieCatalog,
    /// Cancelled on shutdown so in-flight searches stop promptly.
    pub shutdown: CancellationToken,
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/movies/search", post(routes::search_movies))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_search=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    if let Some(path) = &config.seed_path {
        seed::seed_if_empty(&db, path).await?;
    }

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState { catalog: MovieCatalog::new(db), shutdown: shutdown.clone() });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app(state)).with_graceful_shutdown(shutdown_signal(shutdown)).await?;

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
    token.cancel();
}
