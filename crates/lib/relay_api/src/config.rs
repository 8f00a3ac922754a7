//! API server configuration.

use http::HeaderValue;
use thiserror::Error;

/// Errors raised while building [`ApiConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid allowed origin '{0}'")]
    InvalidOrigin(String),

    #[error("Wildcard origin is not allowed when credentials are enabled")]
    WildcardOrigin,
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// Origins permitted to call the API from a browser. Empty denies all.
    pub allowed_origins: Vec<HeaderValue>,
}

impl ApiConfig {
    /// Validates `origins` and builds the config.
    ///
    /// Blank entries are skipped and a trailing `/` is dropped, so
    /// `"http://localhost:3000/"` matches the browser's `Origin` header.
    pub fn new<S: AsRef<str>>(
        bind_addr: impl Into<String>,
        origins: &[S],
    ) -> Result<Self, ConfigError> {
        let allowed_origins = origins
            .iter()
            .map(AsRef::as_ref)
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(parse_origin)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bind_addr: bind_addr.into(),
            allowed_origins,
        })
    }
}

fn parse_origin(raw: &str) -> Result<HeaderValue, ConfigError> {
    let origin = raw.trim_end_matches('/');
    if origin == "*" {
        return Err(ConfigError::WildcardOrigin);
    }
    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
        return Err(ConfigError::InvalidOrigin(raw.to_string()));
    }
    HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_origins_deny_all() {
        let origins: [&str; 0] = [];
        let config = ApiConfig::new("127.0.0.1:0", &origins).unwrap();
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_skipped() {
        let config = ApiConfig::new(
            "127.0.0.1:0",
            &[" http://localhost:3000/ ", "", "https://app.example.com"],
        )
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("https://app.example.com"),
            ]
        );
    }

    #[test]
    fn wildcard_origin_rejected() {
        assert!(matches!(
            ApiConfig::new("127.0.0.1:0", &["*"]),
            Err(ConfigError::WildcardOrigin)
        ));
    }

    #[test]
    fn origin_without_scheme_rejected() {
        assert!(matches!(
            ApiConfig::new("127.0.0.1:0", &["localhost:3000"]),
            Err(ConfigError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn origin_with_control_chars_rejected() {
        assert!(matches!(
            ApiConfig::new("127.0.0.1:0", &["http://bad\nhost"]),
            Err(ConfigError::InvalidOrigin(_))
        ));
    }
}
