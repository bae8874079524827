//! Centralized configuration (environment variables + defaults).

use crate::error::{GridError, GridResult};

/// Connection settings for one service instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the service instance.
    pub base_url: String,
    /// Database token generated in the service's settings.
    pub token: String,
}

impl Config {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Reads `ROWGRID_BASE_URL` and `ROWGRID_API_TOKEN`, honoring a local
    /// `.env` file.
    pub fn from_env() -> GridResult<Self> {
        dotenv::dotenv().ok();
        let base_url = require_env("ROWGRID_BASE_URL")?;
        let token = require_env("ROWGRID_API_TOKEN")?;
        Ok(Self { base_url, token })
    }
}

fn require_env(name: &str) -> GridResult<String> {
    std::env::var(name).map_err(|_| GridError::MissingEnv {
        name: name.to_string(),
    })
}
