use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub mod common;
mod events;
mod scripts;

pub fn build_routes(state: Arc<AppState>) -> Router {
    let script_route = format!("/{}/:script_name", state.config.script_prefix.trim_matches('/'));

    Router::new()
        // Script serving, first-party path
        .route(&script_route, get(scripts::serve_script))
        // Event relay
        .route("/api/event", post(events::relay_event))
        // Health
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}
