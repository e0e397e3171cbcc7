use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::AppError;
use crate::proxy::events::{ClientInfo, EVENT_CACHE_CONTROL, EVENT_CONTENT_TYPE};
use crate::state::AppState;

/// POST /api/event
///
/// Relays the body untouched and mirrors the upstream status; only the
/// forwarding headers are rewritten, and the response always carries our
/// fixed headers instead of the upstream's. Cross-origin callers are the
/// normal case here - the tracking script posts from whatever site embeds
/// it - so there is deliberately no origin check.
pub async fn relay_event(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client = ClientInfo::from_parts(&headers, addr.ip(), &uri);

    match state
        .upstream
        .post_event(body, &client.forwarded_for, &client.user_agent)
        .await
    {
        Ok((status, body)) => (
            status,
            [
                (header::CONTENT_TYPE, EVENT_CONTENT_TYPE),
                (header::CACHE_CONTROL, EVENT_CACHE_CONTROL),
            ],
            body,
        )
            .into_response(),
        Err(e @ AppError::UpstreamTimeout { .. }) => {
            tracing::warn!("Event relay failed: {}", e);
            (StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout").into_response()
        }
        Err(e) => {
            // No upstream status to mirror
            tracing::error!("Event relay failed: {}", e);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}
