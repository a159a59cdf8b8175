//! Error types for registry-auth-token-rs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or resolving credentials.
///
/// Missing credentials are never an error; resolvers report them as `None`.
#[derive(Error, Debug)]
pub enum Error {
    /// Registry URL could not be parsed, or has no host.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Config file not found.
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to read a config file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid base64 encoding in a `_password` value.
    #[error("invalid base64 encoding in _password field")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Decoded password is not UTF-8.
    #[error("invalid UTF-8 in decoded password")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for registry-auth-token-rs operations.
pub type Result<T> = std::result::Result<T, Error>;
