use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::proxy::scripts::{SCRIPT_CACHE_CONTROL, SCRIPT_CONTENT_TYPE};
use crate::state::AppState;

/// GET /<script_prefix>/:script_name
///
/// Serves the provider's tracking script from this host so ad-block lists
/// keyed on the provider's domain never see it.
pub async fn serve_script(
    State(state): State<Arc<AppState>>,
    Path(script_name): Path<String>,
) -> Response {
    match state.scripts.fetch(&state.upstream, &script_name).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, SCRIPT_CONTENT_TYPE),
                (header::CACHE_CONTROL, SCRIPT_CACHE_CONTROL.as_str()),
            ],
            bytes,
        )
            .into_response(),
        Err(AppError::InvalidScript(name)) => {
            tracing::debug!("Rejected request for unknown script {}", name);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(e @ AppError::UpstreamTimeout { .. }) => {
            tracing::warn!("Script fetch failed: {}", e);
            (StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout").into_response()
        }
        Err(e) => {
            tracing::error!("Script fetch failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
