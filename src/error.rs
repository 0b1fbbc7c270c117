use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

/// An enum for describing and handling various errors encountered while
/// gathering commits for, or writing, a changelog.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse package metadata {path}: {source}")]
    PackageParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot get current directory")]
    CurrentDir,

    #[error("cannot get the previous tag: {0}")]
    TagLookup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to convert date/time to string format")]
    TimeFormat(#[from] time::error::Format),

    #[error("failed to serialize changelog")]
    Json(#[from] serde_json::Error),
}
