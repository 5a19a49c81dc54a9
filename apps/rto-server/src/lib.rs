//! RTO Status Dashboard Server
//!
//! Serves the dashboard's JSON API and static front end. Uploaded RTO status
//! snapshots and the user directory live in a single JSON document.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod services;
pub mod state;

use std::sync::Arc;

use auth::{JwtManager, PasswordHasher};
use axum::Router;
use rto_store::RtoStore;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::AppState;

/// Creates the application router with all routes configured.
pub fn create_app<S: RtoStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = api::create_router(state.clone());

    let static_dir = &state.config.static_dir;
    if static_dir.is_dir() {
        router = router.fallback_service(ServeDir::new(static_dir));
    } else {
        tracing::warn!(dir = %static_dir.display(), "Static directory not found, serving API only");
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: RtoStore>(config: Config, store: S) -> Arc<AppState<S>> {
    let jwt_manager = JwtManager::new(config.jwt_config());

    Arc::new(AppState::new(
        config,
        store,
        jwt_manager,
        PasswordHasher::new(),
    ))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
