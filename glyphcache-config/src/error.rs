//! Typed error variants for the glyphcache-config crate.
//!
//! Callers that only need a message can keep using `anyhow`; `ConfigError`
//! converts into `anyhow::Error` like any other `std::error::Error`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error on config file '{path}': {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid TOML.
    #[error("TOML parse error in config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized back to TOML.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string names the field and the reason.
    #[error("Config validation error: {0}")]
    Validation(String),
}
