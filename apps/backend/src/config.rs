//! Runtime configuration read from the environment.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Gemini API settings. Present only when an API key is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// PostgreSQL URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub gemini: Option<GeminiConfig>,
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// Recognised vars:
    /// - HOST, PORT: bind address (defaults 0.0.0.0:8080)
    /// - DATABASE_URL: PostgreSQL connection string
    /// - DATABASE_MAX_CONNECTIONS: pool size (default 10)
    /// - GEMINI_API_KEY, GEMINI_MODEL, GEMINI_BASE_URL: content generation
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse(var("PORT"), "PORT", "port number", 8080)?;
        let max_connections = parse(
            var("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            "connection count",
            10,
        )?;

        let gemini = var("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-pro".to_string()),
            base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
        });

        Ok(Self {
            host,
            port,
            database_url: var("DATABASE_URL"),
            max_connections,
            gemini,
        })
    }

    /// Address to bind the HTTP listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value: raw,
        }),
        None => Ok(default),
    }
}
