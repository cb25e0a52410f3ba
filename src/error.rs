//! Error types for the socks5-proxy-checker crate.

use std::path::PathBuf;

use thiserror::Error;

/// A candidate line that is not of the form `[user:password@]host`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid proxy line: {line}")]
pub struct ParseError {
    /// The offending line, verbatim.
    pub line: String,
}

/// Errors returned by pool selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The pool holds no proxies.
    #[error("no proxies available")]
    NoProxyAvailable,
    /// The selection policy tag is not recognized.
    #[error("unknown proxy selection policy: {0}")]
    UnknownPolicy(String),
}

/// A proxy failed its probe request.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The HTTP client for the proxy could not be built.
    #[error("[{endpoint}] failed to create proxy dialer: {source}")]
    Client {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The probe request did not get a response through the proxy.
    #[error("[{endpoint}] probe request failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A fingerprint artifact could not be persisted.
#[derive(Debug, Error)]
#[error("failed to write artifact {}: {source}", .path.display())]
pub struct ArtifactError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Fatal errors that stop a checker run.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// Reading the candidate list or writing the snapshot failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Fetching a remote candidate list failed.
    #[error("failed to fetch proxy list from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// A candidate line was malformed and the run was configured to abort.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CheckerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
