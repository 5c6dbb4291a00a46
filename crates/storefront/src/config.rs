//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional. Without `FARM_API_URL` the storefront runs
//! entirely on the built-in catalog and the local cart store.
//!
//! - `FARM_API_URL` - Base URL of the remote REST service (e.g.
//!   `http://localhost:8080/api`). Presence enables the remote cart path.
//! - `FARM_AUTH_TOKEN` - Bearer token sent with remote requests
//! - `FARM_HTTP_TIMEOUT_SECS` - Remote request timeout (default: 30)
//! - `FARM_DATA_DIR` - Directory for the local cart store (default: `.prasanna-farm`)
//! - `FARM_CHECKOUT_DELAY_MS` - Simulated payment processing time (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".prasanna-farm";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHECKOUT_DELAY_MS: u64 = 2000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote service settings; `None` means remote-disabled.
    pub remote: Option<RemoteConfig>,
    /// Directory holding the local persistence store
    pub data_dir: PathBuf,
    /// Simulated payment processing delay at checkout
    pub checkout_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote REST service configuration.
///
/// Implements `Debug` manually to redact the auth token.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Optional bearer token
    pub auth_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteConfig {
    /// Remote settings for a base URL with no token and the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url("FARM_API_URL", base_url)?,
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let remote = match get_optional(&lookup, "FARM_API_URL") {
            Some(url) => Some(RemoteConfig {
                base_url: normalize_base_url("FARM_API_URL", &url)?,
                auth_token: get_optional(&lookup, "FARM_AUTH_TOKEN").map(SecretString::from),
                timeout: Duration::from_secs(get_parsed(
                    &lookup,
                    "FARM_HTTP_TIMEOUT_SECS",
                    DEFAULT_HTTP_TIMEOUT_SECS,
                )?),
            }),
            None => None,
        };

        let data_dir = get_optional(&lookup, "FARM_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let checkout_delay = Duration::from_millis(get_parsed(
            &lookup,
            "FARM_CHECKOUT_DELAY_MS",
            DEFAULT_CHECKOUT_DELAY_MS,
        )?);

        Ok(Self {
            remote,
            data_dir,
            checkout_delay,
            sentry_dsn: get_optional(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration with no remote service, storing data in `data_dir`.
    #[must_use]
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            remote: None,
            data_dir: data_dir.into(),
            checkout_delay: Duration::from_millis(DEFAULT_CHECKOUT_DELAY_MS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Whether a remote endpoint was configured.
    #[must_use]
    pub const fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating empty values as unset.
fn get_optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get a variable parsed as `u64`, with a default when unset.
fn get_parsed(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    get_optional(lookup, key).map_or(Ok(default), |v| {
        v.parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Validate an http(s) base URL and strip trailing slashes.
fn normalize_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_remote() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.remote_enabled());
        assert_eq!(config.data_dir, PathBuf::from(".prasanna-farm"));
        assert_eq!(config.checkout_delay, Duration::from_millis(2000));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_empty_api_url_is_remote_disabled() {
        let config = StorefrontConfig::from_lookup(lookup(&[("FARM_API_URL", "  ")])).unwrap();
        assert!(!config.remote_enabled());
    }

    #[test]
    fn test_remote_enabled_with_token() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("FARM_API_URL", "http://localhost:8080/api/"),
            ("FARM_AUTH_TOKEN", "tok-123"),
            ("FARM_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        let remote = config.remote.unwrap();
        assert_eq!(remote.base_url, "http://localhost:8080/api");
        assert_eq!(remote.auth_token.unwrap().expose_secret(), "tok-123");
        assert_eq!(remote.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        let result = StorefrontConfig::from_lookup(lookup(&[("FARM_API_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));

        let result = StorefrontConfig::from_lookup(lookup(&[("FARM_API_URL", "ftp://farm.in")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));

        let result =
            StorefrontConfig::from_lookup(lookup(&[("FARM_CHECKOUT_DELAY_MS", "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_remote_config_debug_redacts_token() {
        let mut remote = RemoteConfig::new("https://api.prasannafarm.in").unwrap();
        remote.auth_token = Some(SecretString::from("super_secret_token"));

        let debug_output = format!("{remote:?}");
        assert!(debug_output.contains("api.prasannafarm.in"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
