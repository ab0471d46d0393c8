use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port to listen on
    pub port: u16,
    /// Path to the SQLite database holding the food and order collections
    pub database_path: PathBuf,
    /// Secret used to sign session tokens
    #[serde(skip_serializing)]
    pub token_secret: Option<String>,
    /// Production mode switches session cookies to `Secure; SameSite=None`
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 2500,
            database_path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("restaurant")
                .join("restaurant.db"),
            token_secret: None,
            production: false,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        if let Ok(port) = std::env::var("RESTAURANT_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RESTAURANT_PORT", port))?;
        }
        if let Ok(db_path) = std::env::var("RESTAURANT_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(secret) = std::env::var("RESTAURANT_TOKEN_SECRET") {
            if !secret.is_empty() {
                config.token_secret = Some(secret);
            }
        }
        // A blank secret counts as unset.
        config.token_secret = config.token_secret.filter(|s| !s.trim().is_empty());
        if let Ok(env) = std::env::var("RESTAURANT_ENV") {
            config.production = env.eq_ignore_ascii_case("production");
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/restaurant/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("restaurant")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                )
            }
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
