//! Error type shared by the calculator, its configuration and its surfaces.
//!
//! Numeric input is never an error: text that does not parse is read as 0.
//! Only structural problems (a metric name nobody knows, a command line
//! that is not a command, a broken config file) are reported.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),
}

pub type CalcResult<T> = Result<T, CalcError>;
