//! HTTP API for the Maison storefront.
//!
//! The router is built from an [`AppState`] holding the database, the
//! loaded configuration and a payment gateway client. Handlers live in
//! `routes`, multi-step workflows (checkout, payment capture, status
//! changes) in `services`, and SQL in `repo`.
//!
//! ```rust,ignore
//! let config = AppConfig::load(Some("maison.toml"))?;
//! maison_server::serve(config).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod logging;
pub mod repo;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::Router;
use maison_auth::{Role, UserCredentials};
use maison_commerce::current_timestamp;
use maison_db::Db;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

/// The full application with middleware applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open the configured database and bring its schema up to date.
pub async fn open_database(config: &AppConfig) -> Result<Db> {
    let db = Db::connect(&config.database.url)
        .await
        .with_context(|| format!("Failed to open database: {}", config.database.url))?;
    maison_db::schema::migrate(&db)
        .await
        .context("Failed to migrate database")?;
    Ok(db)
}

/// Create an admin account, or promote and re-key an existing one.
pub async fn ensure_admin(db: &Db, email: &str, password: &str) -> Result<()> {
    let credentials =
        UserCredentials::register(email, None, password, Role::Admin, current_timestamp())
            .context("Invalid admin credentials")?;
    repo::users::upsert_admin(db, &credentials)
        .await
        .context("Failed to save admin account")?;
    info!(email = %credentials.user.email, "admin account ready");
    Ok(())
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
pub async fn serve(config: AppConfig) -> Result<()> {
    let db = open_database(&config).await?;

    if let (Some(email), Some(password)) = (&config.auth.admin_email, &config.auth.admin_password) {
        ensure_admin(&db, email, password).await?;
    }
    let purged = repo::sessions::purge_expired(&db, current_timestamp()).await?;
    if purged > 0 {
        info!(purged, "expired sessions removed");
    }

    let gateway =
        gateway::from_config(&config.payment).context("Failed to build payment gateway")?;
    info!(provider = gateway.provider(), "payment gateway ready");

    let address = config.server.bind_address();
    let state = AppState::new(db.clone(), config, gateway);
    let app = build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(%address, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
