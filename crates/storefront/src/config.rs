//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `COMMERCE_API_URL` - Base URL of the headless commerce backend
//! - `COMMERCE_API_TOKEN` - Bearer token for the commerce backend (high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `COMMERCE_CART_CACHE_TTL_SECS` - Cart snapshot cache TTL (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::collections::BTreeMap;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Tokens below this many bits of entropy per character are rejected.
const MIN_TOKEN_BITS_PER_CHAR: f64 = 3.3;

/// Default lifetime of a cached cart snapshot.
const DEFAULT_CART_CACHE_TTL_SECS: u64 = 60;

/// Fragments that give away a copied-in sample token (matched case-insensitively).
const SAMPLE_TOKEN_MARKERS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "sample",
    "dummy",
    "token-here",
    "xxx",
    "todo",
    "fixme",
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

impl ConfigError {
    fn invalid(key: &str, reason: impl Display) -> Self {
        Self::InvalidEnvVar(key.to_string(), reason.to_string())
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL; an `https` URL turns on `Secure` cookies
    pub base_url: String,
    /// Commerce backend configuration
    pub commerce: CommerceConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Headless commerce backend configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CommerceConfig {
    /// Base URL, always ending in `/` so relative joins stay under it
    pub api_url: Url,
    /// Bearer token (server-side only)
    pub api_token: SecretString,
    /// How long cart snapshots stay cached before a refetch
    pub cart_cache_ttl: Duration,
}

impl std::fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("cart_cache_ttl", &self.cart_cache_ttl)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first when one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the API token looks like a sample value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: parse_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or("STOREFRONT_PORT", 3000)?,
            base_url: required("STOREFRONT_BASE_URL")?,
            commerce: CommerceConfig::from_env()?,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_api_url("COMMERCE_API_URL", &required("COMMERCE_API_URL")?)?;
        let api_token = api_token("COMMERCE_API_TOKEN", required("COMMERCE_API_TOKEN")?)?;
        let ttl_secs = parse_or("COMMERCE_CART_CACHE_TTL_SECS", DEFAULT_CART_CACHE_TTL_SECS)?;

        Ok(Self {
            api_url,
            api_token,
            cart_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

// =============================================================================
// Environment Readers
// =============================================================================

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `key` into `T`, falling back to `default` when unset.
fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    optional(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e| ConfigError::invalid(key, e))
    })
}

/// Parse a 0.0-1.0 sample rate.
fn sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let rate = parse_or(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::invalid(
            key,
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

/// Parse the commerce API base URL, normalizing it to end in `/`.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::invalid(key, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            key,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// =============================================================================
// Token Checks
// =============================================================================

/// Shannon entropy of `s` in bits per character.
fn bits_per_char(s: &str) -> f64 {
    let counts = s.chars().fold(BTreeMap::<char, u32>::new(), |mut acc, c| {
        *acc.entry(c).or_default() += 1;
        acc
    });
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Accept `value` as the API token unless it looks copied from a sample file
/// or is too repetitive to be a generated credential.
fn api_token(key: &str, value: String) -> Result<SecretString, ConfigError> {
    let lower = value.to_lowercase();
    if let Some(marker) = SAMPLE_TOKEN_MARKERS.iter().find(|m| lower.contains(**m)) {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!("looks like a sample value (contains '{marker}')"),
        ));
    }

    let bits = bits_per_char(&value);
    if bits < MIN_TOKEN_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!(
                "entropy too low ({bits:.2} bits/char, need >= {MIN_TOKEN_BITS_PER_CHAR:.1}); use the token issued by the commerce backend"
            ),
        ));
    }

    Ok(SecretString::from(value))
}
