//! Error types for configuration operations

use thiserror::Error;

/// Errors that can occur while loading settings or credential profiles
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from {path}: {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save config to {path}: {source}")]
    SaveError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("OCI config file not found at {path}")]
    CredentialsNotFound { path: String },

    #[error("Failed to read OCI config {path}: {message}")]
    CredentialsFile { path: String, message: String },

    #[error("Profile '{name}' not found in {path}")]
    ProfileNotFound { name: String, path: String },

    #[error("Profile '{profile}' is missing required key '{key}'")]
    MissingKey { profile: String, key: String },

    #[error("Failed to determine config directory")]
    ConfigDirError,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
