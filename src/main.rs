//! Studio Manager Backend
//!
//! A production-grade REST backend for the booking and staff-payroll
//! dashboard, with SQLite persistence.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod reports;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Studio Manager Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (STUDIO_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Bookings
        .route("/bookings", get(api::list_bookings))
        .route("/bookings", post(api::create_booking))
        .route("/bookings", put(api::replace_bookings))
        .route("/bookings/{id}", get(api::get_booking))
        .route("/bookings/{id}", put(api::update_booking))
        .route("/bookings/{id}", delete(api::delete_booking))
        // Staff
        .route("/staff", get(api::list_staff))
        .route("/staff", post(api::create_staff))
        .route("/staff", put(api::replace_staff))
        .route("/staff/init", post(api::init_staff))
        .route("/staff/{id}", get(api::get_staff))
        .route("/staff/{id}", put(api::update_staff))
        .route("/staff/{id}", delete(api::delete_staff))
        // Activity logs
        .route("/logs", get(api::list_logs))
        .route("/logs", post(api::append_log))
        // Snapshot
        .route("/snapshot/export", get(api::export_snapshot))
        .route("/snapshot/import", post(api::import_snapshot))
        .route("/snapshot/restore", post(api::restore_backup))
        .route("/snapshot/revision", get(api::get_revision))
        // Reports
        .route("/reports/summary", get(api::get_summary))
        .route("/reports/monthly", get(api::get_monthly))
        // Session
        .route("/session", get(api::get_session))
        .route("/session", put(api::set_session))
        .route("/session", delete(api::clear_session))
        // Migrations
        .route("/migrations", get(api::list_migrations))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
