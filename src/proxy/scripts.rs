//! Tracking-script allow-list and read-through cache.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::error::{AppError, AppResult};
use crate::proxy::upstream::UpstreamClient;

/// Script variants the proxy will serve.
/// Ref: https://plausible.io/docs/script-extensions
pub static ALLOWED_SCRIPT_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "script.js",
        "script.hash.js",
        "script.outbound-links.js",
        "script.file-downloads.js",
        "script.exclusions.js",
        "script.compat.js",
        "script.local.js",
        "script.manual.js",
    ])
});

/// Cached script bytes are reused for a day, then lazily refetched.
pub const CACHE_TTL: u64 = 86400;

pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript";

pub static SCRIPT_CACHE_CONTROL: Lazy<String> =
    Lazy::new(|| format!("public, must-revalidate, max-age={}", CACHE_TTL));

struct CachedScript {
    bytes: Bytes,
    inserted_at: Instant,
}

/// Read-through cache in front of the provider's script endpoint.
///
/// Entries expire by TTL only; there is no background refresh and no explicit
/// invalidation. Two concurrent misses for the same name may both fetch and
/// both insert - the result is identical, so the race is left unguarded.
pub struct ScriptStore {
    entries: DashMap<String, CachedScript>,
    ttl: Duration,
}

impl ScriptStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(CACHE_TTL))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Resolve a script name to its bytes, hitting the provider only on a
    /// cache miss. Names outside the allow-list fail before any I/O.
    pub async fn fetch(&self, upstream: &UpstreamClient, script_name: &str) -> AppResult<Bytes> {
        if !ALLOWED_SCRIPT_NAMES.contains(script_name) {
            return Err(AppError::InvalidScript(script_name.to_string()));
        }

        if let Some(bytes) = self.get_fresh(script_name) {
            tracing::debug!("Serving {} from cache", script_name);
            return Ok(bytes);
        }

        let bytes = upstream.fetch_script(script_name).await?;
        self.entries.insert(
            script_name.to_string(),
            CachedScript {
                bytes: bytes.clone(),
                inserted_at: Instant::now(),
            },
        );
        Ok(bytes)
    }

    fn get_fresh(&self, script_name: &str) -> Option<Bytes> {
        let entry = self.entries.get(script_name)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            // Stale; drop the shard guard before removing, then refetch
            drop(entry);
            self.entries.remove(script_name);
            return None;
        }
        Some(entry.bytes.clone())
    }
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upstream_for(server: &MockServer) -> UpstreamClient {
        let config = ProxyConfig {
            base_url: server.uri(),
            request_timeout: 5,
            ..ProxyConfig::default()
        };
        UpstreamClient::new(&config).unwrap()
    }

    #[test]
    fn test_cache_control_matches_ttl() {
        assert_eq!(&*SCRIPT_CACHE_CONTROL, "public, must-revalidate, max-age=86400");
    }

    #[tokio::test]
    async fn test_unknown_script_rejected_without_io() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = ScriptStore::new();
        let err = store
            .fetch(&upstream_for(&server), "xxx.js")
            .await
            .unwrap_err();

        match err {
            AppError::InvalidScript(name) => assert_eq!(name, "xxx.js"),
            other => panic!("Expected InvalidScript, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_hits_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/js/script.js"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"!function(){}".as_slice()))
            .expect(1)
            .mount(&server)
            .await;

        let store = ScriptStore::new();
        let upstream = upstream_for(&server);

        let first = store.fetch(&upstream, "script.js").await.unwrap();
        let second = store.fetch(&upstream, "script.js").await.unwrap();

        assert_eq!(first, second);
        // expect(1) verifies the second fetch issued no network call
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/js/script.js"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"!function(){}".as_slice()))
            .expect(2)
            .mount(&server)
            .await;

        let store = ScriptStore::with_ttl(Duration::ZERO);
        let upstream = upstream_for(&server);

        store.fetch(&upstream, "script.js").await.unwrap();
        store.fetch(&upstream, "script.js").await.unwrap();
    }

    #[tokio::test]
    async fn test_upstream_error_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let store = ScriptStore::new();
        let upstream = upstream_for(&server);

        assert!(store.fetch(&upstream, "script.js").await.is_err());
        // A failed fetch leaves no entry behind, so the next request retries
        assert!(store.fetch(&upstream, "script.js").await.is_err());
    }
}
