//! Relay configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_SHOP` - Shopify store domain (e.g., mycopet.myshopify.com)
//! - `SHOPIFY_ADMIN_TOKEN` - Admin API access token (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-07)
//! - `SHOPIFY_API_BASE_URL` - Override for the Admin API origin (default: `https://{shop}`)
//! - `SHOPIFY_TIMEOUT_SECS` - Upstream request timeout (default: none)
//! - `CORS_ALLOWED_ORIGIN` - Origin allowed to call the relay from a browser
//!   (default: `https://{shop}`)
//! - `ALLOWED_PROXY_HOST` - Substring the forwarded host must contain
//!   (default: unset, check disabled)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "2024-07";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Relay application configuration.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// Exact `Origin` value that receives CORS headers
    pub cors_allowed_origin: String,
    /// Substring the forwarded host must contain, if the proxy check is enabled
    pub allowed_proxy_host: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., mycopet.myshopify.com)
    pub shop: String,
    /// Admin API version (e.g., 2024-07)
    pub api_version: String,
    /// Origin the GraphQL path is joined onto
    pub api_base_url: Url,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("shop", &self.shop)
            .field("api_version", &self.api_version)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("access_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ShopifyConfig {
    /// Returns the Admin GraphQL endpoint for the configured version.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be joined with the API path.
    pub fn graphql_endpoint(&self) -> Result<Url, url::ParseError> {
        self.api_base_url
            .join(&format!("admin/api/{}/graphql.json", self.api_version))
    }

    fn from_source<F>(source: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let shop = get_required(source, "SHOPIFY_SHOP")?;
        let access_token = get_required(source, "SHOPIFY_ADMIN_TOKEN")?;

        let api_base_url = get_optional(source, "SHOPIFY_API_BASE_URL")
            .unwrap_or_else(|| format!("https://{shop}"));
        let api_base_url = Url::parse(&api_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPIFY_API_BASE_URL".to_string(), e.to_string())
        })?;

        let timeout = get_optional(source, "SHOPIFY_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPIFY_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let config = Self {
            shop,
            api_version: get_or_default(source, "SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            api_base_url,
            access_token: SecretString::from(access_token),
            timeout,
        };

        config.graphql_endpoint().map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPIFY_API_VERSION".to_string(), e.to_string())
        })?;

        Ok(config)
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the shop domain or access token is missing, or
    /// if any optional variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`RelayConfig::from_env`].
    pub fn from_source<F>(source: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let shopify = ShopifyConfig::from_source(source)?;

        let host = get_or_default(source, "HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_or_default(source, "PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let cors_allowed_origin = get_optional(source, "CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| format!("https://{}", shopify.shop));
        let allowed_proxy_host = get_optional(source, "ALLOWED_PROXY_HOST");

        let sentry_dsn = get_optional(source, "SENTRY_DSN");
        let sentry_environment = get_optional(source, "SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional(source, "SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional(source, "SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            host,
            port,
            shopify,
            cors_allowed_origin,
            allowed_proxy_host,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Non-fatal problems found while loading, to be logged once tracing is up.
    ///
    /// Shopify tokens are random hex, so a weak-looking token is reported but
    /// never refuses to boot.
    #[must_use]
    pub fn warnings(&self) -> Vec<ConfigError> {
        validate_secret_strength(self.shopify.access_token.expose_secret(), "SHOPIFY_ADMIN_TOKEN")
            .err()
            .into_iter()
            .collect()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable. Empty values count as missing.
fn get_required<F>(source: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get_optional(source, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional variable, treating empty values as unset.
fn get_optional<F>(source: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    source(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get a variable with a default value.
fn get_or_default<F>(source: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_optional(source, key).unwrap_or_else(|| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Check that a secret is not a placeholder and has plausible entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
