//! Embed-tag helper.
//!
//! Sites rendering their own HTML can use this to emit the `<script>` tag
//! that loads the proxied tracking script.

use crate::config::ProxyConfig;

/// Render the script tag for the proxied tracking script.
///
/// Domain resolution order: explicit argument, then the configured default,
/// then the request's own host. `script` defaults to `script.js`.
pub fn script_tag(
    config: &ProxyConfig,
    request_host: &str,
    domain: Option<&str>,
    script: Option<&str>,
) -> String {
    let domain = domain
        .or(config.default_domain.as_deref())
        .unwrap_or(request_host);
    let script = script.unwrap_or("script.js");

    format!(
        r#"<script data-domain="{}" src="/{}/{}" defer></script>"#,
        domain,
        config.script_prefix.trim_matches('/'),
        script
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_with_domain_from_request() {
        let tag = script_tag(&ProxyConfig::default(), "example.com", None, None);
        assert_eq!(
            tag,
            r#"<script data-domain="example.com" src="/js/script.js" defer></script>"#
        );
    }

    #[test]
    fn test_uses_configured_domain_if_defined() {
        let config = ProxyConfig {
            default_domain: Some("example2.com".to_string()),
            ..ProxyConfig::default()
        };
        let tag = script_tag(&config, "example.com", None, None);
        assert_eq!(
            tag,
            r#"<script data-domain="example2.com" src="/js/script.js" defer></script>"#
        );
    }

    #[test]
    fn test_explicit_domain_wins() {
        let config = ProxyConfig {
            default_domain: Some("example2.com".to_string()),
            ..ProxyConfig::default()
        };
        let tag = script_tag(&config, "example.com", Some("example3.com"), None);
        assert!(tag.contains(r#"data-domain="example3.com""#));
    }

    #[test]
    fn test_modifies_src_if_script_prefix_defined() {
        let config = ProxyConfig {
            script_prefix: "hello_world/js".to_string(),
            ..ProxyConfig::default()
        };
        let tag = script_tag(&config, "example.com", None, Some("script.manual.js"));
        assert_eq!(
            tag,
            r#"<script data-domain="example.com" src="/hello_world/js/script.manual.js" defer></script>"#
        );
    }
}
