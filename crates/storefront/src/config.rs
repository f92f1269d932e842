//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PRICING_API_BASE_URL` - Base URL of the Pricing Service REST API
//!
//! ## Optional
//! - `PRICING_API_KEY` - API key sent as `X-Api-Key` on every request
//! - `PRICING_API_TIMEOUT_SECS` - Request timeout in seconds (default: 10)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Pricing Service API configuration
    pub pricing: PricingApiConfig,
}

/// Pricing Service API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PricingApiConfig {
    /// Base URL of the Pricing Service (e.g., <https://api.example.com/v1>)
    pub base_url: Url,
    /// Optional API key for authenticated deployments
    pub api_key: Option<SecretString>,
    /// Per-request timeout; a hanging request must not leave the engines
    /// loading forever
    pub timeout: Duration,
}

impl std::fmt::Debug for PricingApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            pricing: PricingApiConfig::from_env()?,
        })
    }
}

impl PricingApiConfig {
    /// Load Pricing Service configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PRICING_API_BASE_URL` is missing or not a
    /// valid URL, or if the timeout is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("PRICING_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PRICING_API_BASE_URL".to_string(), e.to_string())
        })?;

        let api_key = get_optional_env("PRICING_API_KEY").map(SecretString::from);

        let timeout_secs = get_env_or_default(
            "PRICING_API_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("PRICING_API_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default fallback.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
