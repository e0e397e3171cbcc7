//! Server-side computation of the forwarding headers.
//!
//! `x-forwarded-for` and `user-agent` are always recomputed from what this
//! server observed about the connection; values with those names supplied by
//! the caller are folded into the chain, never forwarded verbatim.

use std::net::IpAddr;

use axum::http::{header, HeaderMap};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Extend the inbound `x-forwarded-for` chain with the peer address, or start
/// a new chain from the peer address alone.
pub fn forwarded_for(headers: &HeaderMap, remote_addr: IpAddr) -> String {
    match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) if !existing.is_empty() => format!("{}, {}", existing, remote_addr),
        _ => remote_addr.to_string(),
    }
}

/// Inbound `user-agent` passthrough; empty string when absent or unreadable.
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn remote() -> IpAddr {
        "1.2.3.4".parse().unwrap()
    }

    #[test]
    fn test_forwarded_for_without_proxy() {
        let headers = HeaderMap::new();
        assert_eq!(forwarded_for(&headers, remote()), "1.2.3.4");
    }

    #[test]
    fn test_forwarded_for_with_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("1.1.1.1, 2.2.2.2"),
        );
        assert_eq!(
            forwarded_for(&headers, remote()),
            "1.1.1.1, 2.2.2.2, 1.2.3.4"
        );
    }

    #[test]
    fn test_forwarded_for_ignores_empty_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(""));
        assert_eq!(forwarded_for(&headers, remote()), "1.2.3.4");
    }

    #[test]
    fn test_user_agent_passthrough() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        assert_eq!(user_agent(&headers), "Mozilla/5.0");
    }

    #[test]
    fn test_user_agent_missing_is_empty() {
        assert_eq!(user_agent(&HeaderMap::new()), "");
    }
}
