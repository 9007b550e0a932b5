//! Application entry point and server initialization
//!
//! Loads configuration, opens the database, seeds the administrator account
//! and serves the API until SIGINT or SIGTERM.

use std::error::Error;

use axum::http::{header, HeaderValue, Method};
use chrono::Utc;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use railcomplaint::auth::ensure_admin;
use railcomplaint::config::Config;
use railcomplaint::database::{init_db, AppState};
use railcomplaint::repository::{RevokedTokenRepo, SessionRepo};
use railcomplaint::route::create_app;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("railcomplaint=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let db = init_db(&config.database_url)?;

    match &config.admin {
        Some(seed) => {
            ensure_admin(&db, seed)?;
        }
        None => tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, no administrator seeded"),
    }

    let now = Utc::now();
    let sessions = SessionRepo::purge_expired(&db, now)?;
    let tokens = RevokedTokenRepo::purge_expired(&db, now)?;
    tracing::debug!(sessions, tokens, "Purged expired credentials");

    let cors = cors_layer(&config.cors_origins);
    let addr = format!("{}:{}", config.host, config.port);
    let database_url = config.database_url.clone();

    let app = create_app(AppState::new(db, config))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, database = %database_url, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM so in-flight requests and open
/// write transactions can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
