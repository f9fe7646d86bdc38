use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Read once at startup and handed to handlers through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default base directory for every file operation (`PII_PATH`).
    pub pii_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let pii_path = match std::env::var("PII_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_pii_path()?,
        };

        Ok(Config {
            pii_path,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration rooted at an explicit directory. Used by tests.
    #[cfg(test)]
    pub fn with_pii_path(pii_path: impl Into<PathBuf>) -> Self {
        Config {
            pii_path: pii_path.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn default_pii_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Could not determine the working directory")?;
    Ok(cwd.join("pii"))
}
