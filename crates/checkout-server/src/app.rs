//! Router

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    client_config, create_session, embed_snippet, get_settings, health_check, purge_settings,
    save_settings,
};
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let profile = state.profile.clone();

    // The browser script may live on another origin than this service
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Checkout (public)
        .route(&profile.create_session_path(), post(create_session))
        .route(&profile.config_path(), get(client_config))
        .route(&profile.embed_path(), get(embed_snippet))
        // Settings (admin)
        .route(
            "/admin/settings",
            get(get_settings).post(save_settings).delete(purge_settings),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
