//! Request helper configuration.
//!
//! CSRF support is an option on one helper rather than a second helper.
//! Both structs deserialize with defaults so a host can load them from JSON.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CSRF_COOKIE: &str = "CSRF-Token";
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// When set, every request carries the CSRF header.
    pub csrf: Option<CsrfConfig>,
}

impl RequestConfig {
    pub fn with_csrf() -> Self {
        Self {
            csrf: Some(CsrfConfig::default()),
        }
    }
}

/// Where the token is read from and which header carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
            header_name: DEFAULT_CSRF_HEADER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_csrf() {
        assert!(RequestConfig::default().csrf.is_none());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: RequestConfig = serde_json::from_str(r#"{"csrf":{}}"#).unwrap();
        assert_eq!(config, RequestConfig::with_csrf());

        let config: RequestConfig =
            serde_json::from_str(r#"{"csrf":{"header_name":"X-XSRF-Token"}}"#).unwrap();
        let csrf = config.csrf.unwrap();
        assert_eq!(csrf.cookie_name, "CSRF-Token");
        assert_eq!(csrf.header_name, "X-XSRF-Token");

        let config: RequestConfig = serde_json::from_str("{}").unwrap();
        assert!(config.csrf.is_none());
    }
}
