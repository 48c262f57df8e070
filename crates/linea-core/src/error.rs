//! Error types for `linea-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Transport failures keep
//! their own type, [`RemoteError`], and convert into [`CoreError::Remote`].

use std::path::PathBuf;

use crate::remote::RemoteError;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message. Remote failures display their message verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The remote client failed (authentication, reachability, protocol).
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// An operation that needs a live connection was invoked while
    /// disconnected. This is a contract violation by the caller.
    #[error("not connected")]
    NotConnected,

    /// The server address could not be parsed into a host and port.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `linea-core`.
pub type CoreResult<T> = Result<T, CoreError>;
