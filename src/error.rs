use std::path::PathBuf;
use thiserror::Error;

/// The response catalog could not be loaded.
///
/// Callers recover by running with an empty catalog.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("catalog not found at {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog shape: {0}")]
    Shape(String),
}

/// Delivering a reply to the platform failed.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("send timed out")]
    Timeout,

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("platform rejected {method}: {description}")]
    Api { method: String, description: String },
}

impl From<reqwest::Error> for SendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// An inbound event the resolver cannot work with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedEventError {
    #[error("message has no text")]
    MissingText,
}
