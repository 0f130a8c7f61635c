//! Application Configuration Module
//!
//! Centralizes everything the interview service reads from the
//! environment and exposes it as a single shareable struct.

use std::env;
use tracing::Level;

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub agent_id: String,
    pub gemini_api_key: String,
    pub feedback_model: String,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `ELEVENLABS_AGENT_ID`: The conversational agent conducting the interview. Required.
    // *   `GEMINI_API_KEY`: Your secret key for the Gemini API. Required.
    // *   `FEEDBACK_MODEL`: (Optional) The model used for the performance review. Defaults to "gemini-1.5-flash".
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. Useful for local development, ignored if not present.
        dotenvy::dotenv().ok();

        let agent_id = env::var("ELEVENLABS_AGENT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("ELEVENLABS_AGENT_ID".to_string()))?;

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let feedback_model =
            env::var("FEEDBACK_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());

        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            agent_id,
            gemini_api_key,
            feedback_model,
            log_level,
        })
    }
}
