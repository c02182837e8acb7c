use crate::document::Server;
use crate::rules::{Category, Detector, RuleMetadata};

/// GUARD-003: No HTTPS
///
/// Flags declared server URLs that do not use the `https://` scheme.
/// Empty URLs are ignored.
pub struct NoHttpsDetector;

impl Detector for NoHttpsDetector {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "GUARD-003".into(),
            category: Category::NoHttps,
            name: "No HTTPS".into(),
            description: "Server URL does not use TLS".into(),
            cwe_id: Some("CWE-319".into()),
        }
    }

    fn check_server(&self, server: &Server) -> Option<String> {
        if server.url.is_empty() || server.url.starts_with("https://") {
            None
        } else {
            Some(server.url.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(url: &str) -> Option<String> {
        NoHttpsDetector.check_server(&Server { url: url.into() })
    }

    #[test]
    fn flags_plain_http() {
        assert_eq!(
            check("http://api.example.com"),
            Some("http://api.example.com".into())
        );
    }

    #[test]
    fn flags_relative_and_templated_urls() {
        assert!(check("/v1").is_some());
        assert!(check("{scheme}://api.example.com").is_some());
    }

    #[test]
    fn prefix_match_is_literal() {
        assert!(check("HTTPS://api.example.com").is_some());
        assert!(check("https://api.example.com").is_none());
        assert!(check("").is_none());
    }

    proptest! {
        #[test]
        fn https_urls_never_flagged(rest in "[a-z0-9./:-]{0,40}") {
            let url = format!("https://{rest}");
            prop_assert!(check(&url).is_none());
        }

        #[test]
        fn other_urls_always_flagged(url in "[a-z][a-z0-9./:-]{0,40}") {
            prop_assume!(!url.starts_with("https://"));
            prop_assert_eq!(check(&url), Some(url.clone()));
        }
    }
}
