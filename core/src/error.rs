use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of an event source to hand out points.
///
/// Aggregators absorb these: the last good snapshot stays published.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("event source unavailable: {0}")]
    Unavailable(String),

    #[error("event source did not answer within {0:?}")]
    Timeout(Duration),
}

/// Errors loading the viewer or spell configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load stored configuration")]
    Confy(#[from] confy::ConfyError),
}

/// Errors loading a JSON event dump.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("IO error reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid event dump {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
