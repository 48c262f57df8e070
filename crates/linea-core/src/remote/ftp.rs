//! FTP implementation of [`RemoteClient`] using `suppaftp`.
//!
//! The control connection is a blocking [`FtpStream`]. Each call moves the
//! stream onto tokio's blocking pool and back, so the async caller is never
//! blocked on network I/O.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use async_trait::async_trait;
use suppaftp::types::Mode;
use suppaftp::{FtpError, FtpStream};

use super::list_parser::parse_listing;
use super::{ConnectConfig, RemoteClient, RemoteError};
use crate::config::ConnectionConfig;
use crate::entry::{Entry, PARENT_NAME};

/// A [`RemoteClient`] speaking FTP over a plain control connection.
pub struct FtpClient {
    stream: Option<FtpStream>,
    connect_timeout: Duration,
    passive_mode: bool,
}

impl FtpClient {
    /// Creates a client with a 30 second timeout in passive mode.
    pub fn new() -> Self {
        Self::from_config(&ConnectionConfig::default())
    }

    /// Creates a client using the timeout and data-channel mode in `config`.
    ///
    /// The timeout bounds the TCP connect and every read or write on the
    /// control connection.
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            stream: None,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            passive_mode: config.passive_mode,
        }
    }

    /// Returns `true` while a control connection is held.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Runs `f` against the open stream on the blocking pool.
    ///
    /// If the worker panics the stream is lost and the client reports
    /// [`RemoteError::Disconnected`] from then on.
    async fn with_stream<T, F>(&mut self, f: F) -> Result<T, RemoteError>
    where
        F: FnOnce(&mut FtpStream) -> Result<T, RemoteError> + Send + 'static,
        T: Send + 'static,
    {
        let mut stream = self.stream.take().ok_or(RemoteError::Disconnected)?;
        let (stream, result) = tokio::task::spawn_blocking(move || {
            let result = f(&mut stream);
            (stream, result)
        })
        .await
        .map_err(|e| RemoteError::Protocol(format!("FTP worker failed: {e}")))?;
        self.stream = Some(stream);
        result
    }
}

impl Default for FtpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteClient for FtpClient {
    async fn open(&mut self, config: &ConnectConfig) -> Result<Vec<Entry>, RemoteError> {
        if self.is_open() {
            if let Err(e) = self.close().await {
                tracing::debug!("Dropping previous FTP connection failed: {e}");
            }
        }

        let addr = config.address().to_string();
        let username = config.username.clone();
        let password = config.password.clone();
        let timeout = self.connect_timeout;
        let passive = self.passive_mode;

        let (stream, lines) = tokio::task::spawn_blocking(move || {
            let mut ftp = connect_control(&addr, timeout)?;
            if !passive {
                ftp.set_mode(Mode::Active);
            }
            ftp.login(&username, &password).map_err(map_login_error)?;
            let lines = ftp.list(None).map_err(map_ftp_error)?;
            Ok::<_, RemoteError>((ftp, lines))
        })
        .await
        .map_err(|e| RemoteError::Protocol(format!("FTP worker failed: {e}")))??;

        self.stream = Some(stream);
        Ok(parse_listing(&lines))
    }

    async fn close(&mut self) -> Result<(), RemoteError> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        tokio::task::spawn_blocking(move || stream.quit().map_err(map_ftp_error))
            .await
            .map_err(|e| RemoteError::Protocol(format!("FTP worker failed: {e}")))?
    }

    async fn list(&mut self, path: Option<&str>) -> Result<Vec<Entry>, RemoteError> {
        let path = path.map(str::to_string);
        let lines = self
            .with_stream(move |ftp| ftp.list(path.as_deref()).map_err(map_ftp_error))
            .await?;
        Ok(parse_listing(&lines))
    }

    async fn change_directory_and_list(
        &mut self,
        segment: &str,
    ) -> Result<Vec<Entry>, RemoteError> {
        let segment = segment.to_string();
        let lines = self
            .with_stream(move |ftp| {
                // Where to return to if LIST fails after the move.
                let previous = ftp.pwd().ok();
                let changed = if segment == PARENT_NAME {
                    ftp.cdup()
                } else {
                    ftp.cwd(&segment)
                };
                match changed {
                    Ok(()) => {}
                    // Some servers answer CWD with 200 instead of 250.
                    Err(FtpError::UnexpectedResponse(resp)) if resp.status.code() == 200 => {
                        tracing::debug!("Accepting 200 reply to directory change into {segment}");
                    }
                    Err(e) => return Err(map_ftp_error(e)),
                }
                match ftp.list(None) {
                    Ok(lines) => Ok(lines),
                    Err(e) => {
                        if let Some(dir) = previous.as_deref() {
                            restore_directory(ftp, dir);
                        }
                        Err(map_ftp_error(e))
                    }
                }
            })
            .await?;
        Ok(parse_listing(&lines))
    }
}

/// Connects the control channel with `timeout` applied to the connect and
/// to every later read and write, including the server greeting.
fn connect_control(addr: &str, timeout: Duration) -> Result<FtpStream, RemoteError> {
    let socket = resolve(addr)?;
    let unreachable = |e: std::io::Error| RemoteError::Unreachable(format!("{addr}: {e}"));
    let tcp = TcpStream::connect_timeout(&socket, timeout).map_err(unreachable)?;
    tcp.set_read_timeout(Some(timeout)).map_err(unreachable)?;
    tcp.set_write_timeout(Some(timeout)).map_err(unreachable)?;
    FtpStream::connect_with_stream(tcp).map_err(|e| match map_ftp_error(e) {
        RemoteError::Unreachable(msg) => RemoteError::Unreachable(format!("{addr}: {msg}")),
        other => other,
    })
}

fn restore_directory(ftp: &mut FtpStream, dir: &str) {
    match ftp.cwd(dir) {
        Ok(()) => tracing::debug!("Listing failed, returned to {dir}"),
        Err(e) => tracing::warn!("Listing failed and returning to {dir} failed too: {e}"),
    }
}

fn resolve(addr: &str) -> Result<SocketAddr, RemoteError> {
    addr.to_socket_addrs()
        .map_err(|e| RemoteError::Unreachable(format!("{addr}: {e}")))?
        .next()
        .ok_or_else(|| RemoteError::Unreachable(format!("{addr}: no address found")))
}

/// Maps a failed login. Any rejection reply counts as bad credentials.
fn map_login_error(e: FtpError) -> RemoteError {
    match e {
        FtpError::UnexpectedResponse(resp) => RemoteError::Auth(response_text(&resp.body)),
        other => map_ftp_error(other),
    }
}

fn map_ftp_error(e: FtpError) -> RemoteError {
    match e {
        FtpError::ConnectionError(io) => RemoteError::Unreachable(io.to_string()),
        FtpError::UnexpectedResponse(resp) if resp.status.code() == 530 => {
            RemoteError::Auth(response_text(&resp.body))
        }
        other => RemoteError::Protocol(other.to_string()),
    }
}

fn response_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).trim().to_string()
}
