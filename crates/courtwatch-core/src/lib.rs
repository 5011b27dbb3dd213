//! Shared configuration for the courtwatch workspace.
//!
//! Two layers feed a run: process settings read from the environment
//! ([`AppConfig`]) and the availability search read from a YAML file
//! ([`SearchConfig`]).

mod app_config;
mod config;
mod search;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::load_app_config_from_env;
pub use search::{load_search_config, parse_search_config, SearchConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read search config at {path}: {source}")]
    ConfigFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse search config: {0}")]
    ConfigFileParse(#[from] serde_yaml::Error),

    #[error("invalid search config: {0}")]
    Validation(String),
}
