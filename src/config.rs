use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Errors raised while assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("configuration rejected: {0}")]
    Rejected(#[from] validator::ValidationErrors),
}

/// Runtime configuration for the translation service.
///
/// Assembled from `SNOWDAX_*` environment variables or CLI flags and
/// validated before the server starts. `use_llm` gates the enhancement step
/// itself; `cortex_enabled` decides whether a Cortex client is wired at all,
/// so enhancement only runs when both hold.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface the HTTP listener binds to
    #[validate(length(min = 1, message = "bind host must not be empty"))]
    pub http_host: String,

    /// Port the HTTP listener binds to
    #[validate(range(min = 1, message = "bind port must be nonzero"))]
    pub http_port: u16,

    /// Whether low-confidence translations may be sent to Cortex at all
    pub use_llm: bool,

    /// Whether a Cortex client is wired at startup
    pub cortex_enabled: bool,

    /// Cortex model used for enhancement
    #[validate(length(min = 1, message = "Cortex model must be named"))]
    pub cortex_model: String,

    /// Per-request timeout in seconds
    #[validate(range(
        min = 1,
        max = 600,
        message = "request timeout must be between 1 and 600 seconds"
    ))]
    pub request_timeout_secs: u64,

    /// Largest request body the server accepts, in bytes
    #[validate(range(min = 1024, message = "body limit below 1 KiB is unusable"))]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            use_llm: true,
            cortex_enabled: false,
            cortex_model: "mistral-large".to_string(),
            request_timeout_secs: 30,
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            http_host: env::var("SNOWDAX_HOST").unwrap_or(defaults.http_host),
            http_port: env_or("SNOWDAX_PORT", defaults.http_port)?,
            use_llm: env_or("SNOWDAX_USE_LLM", defaults.use_llm)?,
            cortex_enabled: env_or("SNOWDAX_CORTEX_ENABLED", defaults.cortex_enabled)?,
            cortex_model: env::var("SNOWDAX_CORTEX_MODEL").unwrap_or(defaults.cortex_model),
            request_timeout_secs: env_or(
                "SNOWDAX_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            body_limit_bytes: env_or("SNOWDAX_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Build configuration from parsed CLI flags.
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let config = Self {
            http_host: cli.http_host,
            http_port: cli.http_port,
            use_llm: cli.use_llm,
            cortex_enabled: cli.cortex_enabled,
            cortex_model: cli.cortex_model,
            request_timeout_secs: cli.request_timeout_secs,
            body_limit_bytes: cli.body_limit_bytes,
        };

        config.validate()?;
        Ok(config)
    }
}

/// CLI-sourced configuration values, converted from clap arguments in `main`
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub http_host: String,
    pub http_port: u16,
    pub use_llm: bool,
    pub cortex_enabled: bool,
    pub cortex_model: String,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

/// Read an environment variable and parse it into the target type, keeping
/// the typed default when the variable is unset. A set-but-unparseable value
/// is an error rather than a silent fallback.
fn env_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
