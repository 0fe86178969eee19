//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::profile::ValidationMode;

/// Where access failures send the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirects {
    /// Sign-in page, for requests without a live session.
    pub sign_in: String,
    /// Non-premium tracker, for users on the free plan.
    pub free_tracker: String,
}

impl Default for Redirects {
    fn default() -> Self {
        Self {
            sign_in: "/auth".to_string(),
            free_tracker: "/nutrition-tracker".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,
    /// libSQL database file.
    pub db_path: PathBuf,
    /// Directory uploaded photos are written to.
    pub photo_dir: PathBuf,
    /// Fail-fast (default) or aggregate validation.
    pub validation_mode: ValidationMode,
    pub redirects: Redirects,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/fitin.db"),
            photo_dir: PathBuf::from("./data/photos"),
            validation_mode: ValidationMode::default(),
            redirects: Redirects::default(),
        }
    }
}

impl ServerConfig {
    /// Read `FITIN_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("FITIN_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "FITIN_PORT".to_string(),
                message: format!("{raw:?} is not a port number: {e}"),
            })?,
            None => defaults.port,
        };

        let validation_mode = match get("FITIN_VALIDATION_MODE") {
            Some(raw) => raw
                .parse::<ValidationMode>()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "FITIN_VALIDATION_MODE".to_string(),
                    message,
                })?,
            None => defaults.validation_mode,
        };

        Ok(Self {
            port,
            db_path: get("FITIN_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            photo_dir: get("FITIN_PHOTO_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.photo_dir),
            validation_mode,
            redirects: Redirects {
                sign_in: get("FITIN_AUTH_REDIRECT").unwrap_or(defaults.redirects.sign_in),
                free_tracker: get("FITIN_FREE_TRACKER_REDIRECT")
                    .unwrap_or(defaults.redirects.free_tracker),
            },
        })
    }
}
