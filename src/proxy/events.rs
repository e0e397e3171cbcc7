//! Structured event construction for server-initiated submissions.
//!
//! The inbound `/api/event` endpoint relays bodies untouched; this module is
//! the other entry point, for events built on the server (a signup, a plan
//! change) that should still be attributed to the visitor whose request
//! triggered them.
//! Ref: https://plausible.io/docs/events-api

use std::net::IpAddr;

use axum::http::{header, HeaderMap, Uri};
use serde::Serialize;
use serde_json::Value;

use crate::config::ProxyConfig;
use crate::error::AppResult;
use crate::proxy::headers;
use crate::proxy::upstream::UpstreamClient;

/// Response headers for the event relay. The upstream's own headers are
/// discarded; these are what callers get.
pub const EVENT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const EVENT_CACHE_CONTROL: &str = "must-revalidate, max-age=0, private";

/// Wire form of an event. Absent optional fields are omitted from the JSON
/// entirely, never serialized as null.
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    pub name: String,
    pub domain: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
}

/// A server-side event before request-context defaults are applied.
///
/// `name` can be `pageview`, which the provider treats specially; everything
/// else is a custom event.
#[derive(Debug, Clone, Default)]
pub struct CustomEvent {
    pub name: String,
    /// Site in the provider's dashboard. Defaults to the configured domain,
    /// then to the request's own host.
    pub domain: Option<String>,
    /// Page the event happened on. Defaults to the request's absolute URL.
    pub url: Option<String>,
    pub referrer: Option<String>,
    pub screen_width: Option<u32>,
    /// Custom properties for the event.
    pub props: Option<Value>,
    /// Replaces the computed x-forwarded-for chain when set.
    pub remote_addr: Option<String>,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// The slice of the inbound request the forwarder needs.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub host: String,
    pub absolute_url: String,
    pub forwarded_for: String,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn from_parts(req_headers: &HeaderMap, remote_addr: IpAddr, uri: &Uri) -> Self {
        let host = req_headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_default();
        // Scheme as seen by the visitor; a TLS terminator in front of us
        // reports it via x-forwarded-proto.
        let scheme = req_headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("http");
        let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

        Self {
            absolute_url: format!("{}://{}{}", scheme, host, path),
            host,
            forwarded_for: headers::forwarded_for(req_headers, remote_addr),
            user_agent: headers::user_agent(req_headers),
        }
    }
}

/// Resolve request-context defaults into the wire payload.
pub fn build_payload(config: &ProxyConfig, client: &ClientInfo, event: &CustomEvent) -> EventPayload {
    let domain = event
        .domain
        .clone()
        .or_else(|| config.default_domain.clone())
        .unwrap_or_else(|| client.host.clone());
    let url = event
        .url
        .clone()
        .unwrap_or_else(|| client.absolute_url.clone());

    EventPayload {
        name: event.name.clone(),
        domain,
        url,
        referrer: event.referrer.clone(),
        screen_width: event.screen_width,
        props: event.props.clone(),
    }
}

/// Send a custom event on behalf of a client request.
///
/// Returns whether the provider accepted it (2xx status).
pub async fn send_custom_event(
    upstream: &UpstreamClient,
    config: &ProxyConfig,
    client: &ClientInfo,
    event: CustomEvent,
) -> AppResult<bool> {
    let payload = build_payload(config, client, &event);
    let forwarded_for = event
        .remote_addr
        .as_deref()
        .unwrap_or(&client.forwarded_for);

    let (status, _body) = upstream
        .post_event_json(&payload, forwarded_for, &client.user_agent)
        .await?;

    if !status.is_success() {
        tracing::warn!("Provider rejected event {}: {}", payload.name, status);
    }
    Ok(status.is_success())
}
