//! Remote file-server access.
//!
//! [`RemoteClient`] is the capability the [`Session`](crate::session::Session)
//! drives. [`ftp::FtpClient`] implements it over an FTP control connection;
//! tests and other transports provide their own implementations.

pub mod ftp;
pub mod list_parser;

use std::fmt;

use async_trait::async_trait;

use crate::entry::Entry;
use crate::error::{CoreError, CoreResult};

/// Port used when an address does not name one.
pub const DEFAULT_PORT: u16 = 21;

/// Errors raised by a [`RemoteClient`].
///
/// The message variants display their text verbatim so a caller can show
/// it to the user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The server rejected the credentials.
    #[error("{0}")]
    Auth(String),

    /// The host could not be reached or the connection timed out.
    #[error("{0}")]
    Unreachable(String),

    /// The server sent a reply the client could not use.
    #[error("{0}")]
    Protocol(String),

    /// No control connection is open.
    #[error("session disconnected")]
    Disconnected,
}

/// A stateful connection to a remote file server.
///
/// The remote end owns the notion of a current directory: every
/// `change_directory_and_list` call is relative to wherever the previous
/// call left the server, and the literal segment `".."` must move to the
/// parent. Implementations that do not track the server's working
/// directory across calls break parent navigation for the session.
///
/// Any retry policy belongs to the implementation; callers issue exactly one
/// call per user operation.
#[async_trait]
pub trait RemoteClient: Send {
    /// Opens the control connection, authenticates and lists the starting
    /// directory.
    async fn open(&mut self, config: &ConnectConfig) -> Result<Vec<Entry>, RemoteError>;

    /// Closes the connection. Best-effort: a failure here is reported but
    /// the connection is considered gone either way.
    async fn close(&mut self) -> Result<(), RemoteError>;

    /// Lists `path`, or the current directory when `None`.
    async fn list(&mut self, path: Option<&str>) -> Result<Vec<Entry>, RemoteError>;

    /// Changes into `segment` (relative to the current directory) and lists
    /// the new current directory.
    async fn change_directory_and_list(&mut self, segment: &str)
        -> Result<Vec<Entry>, RemoteError>;
}

/// A parsed `host[:port]` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    /// Parses `host`, `host:port`, `[v6]` or `[v6]:port`.
    ///
    /// `default_port` applies when no port is given. A bare IPv6 literal
    /// (more than one `:` and no brackets) is taken as a host without port.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidAddress`] for an empty host, an unterminated
    /// bracket, or a port that is not a number in `1..=65535`.
    pub fn parse(input: &str, default_port: u16) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidAddress(input.to_string());
        let trimmed = input.trim();

        let (host, port) = if let Some(rest) = trimmed.strip_prefix('[') {
            let (host, after) = rest.split_once(']').ok_or_else(invalid)?;
            let port = match after {
                "" => None,
                _ => Some(after.strip_prefix(':').ok_or_else(invalid)?),
            };
            (host, port)
        } else if trimmed.matches(':').count() == 1 {
            let (host, port) = trimmed.split_once(':').ok_or_else(invalid)?;
            (host, Some(port))
        } else {
            (trimmed, None)
        };

        if host.is_empty() {
            return Err(invalid());
        }

        let port = match port.map(str::trim) {
            None | Some("") => default_port,
            Some(p) => match p.parse::<u16>() {
                Ok(n) if n != 0 => n,
                _ => return Err(invalid()),
            },
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Everything a [`RemoteClient`] needs to open a connection.
#[derive(Clone)]
pub struct ConnectConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ConnectConfig {
    /// Builds a config from a parsed address and credentials.
    pub fn new(address: Address, username: &str, password: &str) -> Self {
        Self {
            host: address.host,
            port: address.port,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Returns the `host:port` address to dial.
    pub fn address(&self) -> Address {
        Address {
            host: self.host.clone(),
            port: self.port,
        }
    }

    /// Returns a display label like `"user@host"` or `"user@host:port"`.
    pub fn display_label(&self) -> String {
        if self.port == DEFAULT_PORT {
            format!("{}@{}", self.username, self.host)
        } else {
            format!("{}@{}:{}", self.username, self.host, self.port)
        }
    }
}

impl fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
