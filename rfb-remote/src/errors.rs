//! Error types for connection setup and configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while establishing a session or loading configuration.
///
/// Protocol-level failures after the TCP link is up are not surfaced here;
/// those are reported through the controller's error-code accessors so a
/// caller can distinguish recoverable credential requests from fatal ones.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("could not resolve {host}:{port}")]
    Resolve { host: String, port: u16 },

    #[error("could not connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not read config file {path}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("could not parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
