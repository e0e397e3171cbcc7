//! Outbound HTTP client for the analytics provider.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;

use crate::config::ProxyConfig;
use crate::error::{AppError, AppResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the provider's script and event endpoints.
///
/// Built once from the resolved configuration; the underlying reqwest client
/// pools connections and enforces the request timeout on every call. No
/// retries anywhere - a failure surfaces to the caller immediately.
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    event_url: String,
    timeout_secs: u64,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> Result<Self, String> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let event_url = format!("{}/api/event", base_url);

        Ok(Self {
            client,
            base_url,
            event_url,
            timeout_secs: config.request_timeout,
        })
    }

    pub fn script_url(&self, script_name: &str) -> String {
        format!("{}/js/{}", self.base_url, script_name)
    }

    pub fn event_url(&self) -> &str {
        &self.event_url
    }

    /// Download a tracking script from the provider.
    ///
    /// A non-success status is an error here (the script handler turns it
    /// into a 500); contrast with `post_event`, which passes the upstream
    /// status through untranslated.
    pub async fn fetch_script(&self, script_name: &str) -> AppResult<Bytes> {
        let url = self.script_url(script_name);
        tracing::debug!("Fetching {} from upstream", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("Upstream script fetch failed: {} - {}", url, status);
            return Err(AppError::UpstreamStatus(status));
        }

        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;
        tracing::debug!("Fetched {} ({} bytes)", script_name, bytes.len());
        Ok(bytes)
    }

    /// Relay a raw event submission.
    ///
    /// The body is forwarded byte-for-byte; `x-forwarded-for` and
    /// `user-agent` carry what this server observed about the client, so the
    /// provider attributes the event to the real visitor rather than to us.
    pub async fn post_event(
        &self,
        body: Bytes,
        forwarded_for: &str,
        user_agent: &str,
    ) -> AppResult<(StatusCode, Bytes)> {
        let resp = self
            .client
            .post(&self.event_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", forwarded_for)
            .header(header::USER_AGENT, user_agent)
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok((status, bytes))
    }

    /// Like `post_event`, but serializes a structured payload.
    pub async fn post_event_json<T: Serialize>(
        &self,
        payload: &T,
        forwarded_for: &str,
        user_agent: &str,
    ) -> AppResult<(StatusCode, Bytes)> {
        let resp = self
            .client
            .post(&self.event_url)
            .header("x-forwarded-for", forwarded_for)
            .header(header::USER_AGENT, user_agent)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok((status, bytes))
    }

    fn classify(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            tracing::warn!(
                "Upstream request to {} timed out after {}s",
                self.base_url,
                self.timeout_secs
            );
            AppError::UpstreamTimeout {
                url: self.base_url.clone(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            AppError::Network(error)
        }
    }
}
