//! Linea core library — UI-agnostic remote browsing logic.
//!
//! `linea-core` owns the connection to a remote file server and the listing
//! a frontend displays. It does not render anything; a view feeds user
//! actions in as [`Command`]s (or calls [`Session`] directly) and draws the
//! entries it gets back.
//!
//! # Modules
//!
//! - [`session`] — [`Session`]: connect, disconnect, navigate, refresh.
//! - [`entry`] — [`Entry`] and [`EntryKind`], the listing row model.
//! - [`listing`] — Name ordering and listing normalization.
//! - [`format`] — Size/date presentation and [`DisplayRow`].
//! - [`remote`] — The [`RemoteClient`] trait, address parsing, and the FTP client.
//! - [`event`] — Command and event types for UI ↔ Core communication.
//! - [`config`] — TOML-based settings.
//! - [`error`] — Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod entry;
pub mod error;
pub mod event;
pub mod format;
pub mod listing;
pub mod remote;
pub mod session;

pub use config::Config;
pub use entry::{Entry, EntryKind};
pub use error::{CoreError, CoreResult};
pub use event::{Command, Event};
pub use format::{display_rows, format_date, format_size, DisplayRow};
pub use listing::{compare, normalize, sort_entries, SortDirection};
pub use remote::ftp::FtpClient;
pub use remote::{Address, ConnectConfig, RemoteClient, RemoteError};
pub use session::{ConnectionState, Session};
