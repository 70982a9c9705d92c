//! HTTP Client Factory
//!
//! Builds the reqwest clients shared by the completion provider and the
//! evidence source clients, applying the request timeout and proxy settings.

use std::time::Duration;

use crate::types::ProxyConfig;

/// Build a `reqwest::Client` with a request timeout and optional proxy.
///
/// - `Some(proxy)` -> route every request through the proxy
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
pub fn build_http_client(
    timeout: Duration,
    proxy: Option<&ProxyConfig>,
) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    match proxy {
        Some(cfg) => {
            let mut p = reqwest::Proxy::all(cfg.url.as_str())?;
            if let (Some(u), Some(pw)) = (&cfg.username, &cfg.password) {
                p = p.basic_auth(u, pw);
            }
            builder = builder.proxy(p);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client_no_proxy() {
        assert!(build_http_client(Duration::from_secs(5), None).is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let cfg = ProxyConfig {
            url: "http://127.0.0.1:8080".to_string(),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
        };
        assert!(build_http_client(Duration::from_secs(5), Some(&cfg)).is_ok());
    }

    #[test]
    fn test_build_http_client_rejects_bad_proxy_url() {
        let cfg = ProxyConfig {
            url: "not a url".to_string(),
            username: None,
            password: None,
        };
        assert!(build_http_client(Duration::from_secs(5), Some(&cfg)).is_err());
    }
}
