//! Application configuration loaded from environment variables.
//!
//! All values are read once at startup; nothing re-reads the environment
//! afterwards.

use std::env;

use chrono::Weekday;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// First day of the week used when resolving Week periods
    pub week_start: Weekday,
    /// URL scheme accepted in invite deep links (e.g. "paceline")
    pub deep_link_scheme: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            week_start: Weekday::Mon,
            deep_link_scheme: "paceline".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            week_start: parse_week_start(env::var("WEEK_START").ok().as_deref())?,
            deep_link_scheme: env::var("DEEP_LINK_SCHEME")
                .unwrap_or_else(|_| "paceline".to_string()),
        })
    }
}

/// Parse a week-start name; defaults to Monday when unset.
fn parse_week_start(raw: Option<&str>) -> Result<Weekday, ConfigError> {
    match raw {
        None => Ok(Weekday::Mon),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Weekday::Mon),
            "sunday" | "sun" => Ok(Weekday::Sun),
            "saturday" | "sat" => Ok(Weekday::Sat),
            _ => Err(ConfigError::Invalid("WEEK_START")),
        },
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
