//! Event system for communication between a view and the session.
//!
//! A frontend translates user input into [`Command`]s and hands them to
//! [`Session::dispatch`], which answers with an [`Event`]. A row activated
//! in the listing (double-click, Enter) becomes [`Command::Navigate`] with
//! the full entry, so the session can branch on its kind.

use std::fmt;

use crate::entry::Entry;
use crate::listing::SortDirection;
use crate::remote::RemoteClient;
use crate::session::Session;

/// An action the UI requests the session to perform.
///
/// Commands flow **UI → Core**.
#[derive(Clone)]
pub enum Command {
    /// Connect to `address` (`host` or `host:port`).
    Connect {
        address: String,
        username: String,
        password: String,
    },
    /// Drop the connection.
    Disconnect,
    /// A listing row was activated.
    Navigate(Entry),
    /// Change into the named directory.
    ChangeDirectory(String),
    /// Move to the parent directory.
    GoUp,
    /// Re-read the current directory.
    Refresh,
    /// Change the sort direction.
    SetSort(SortDirection),
    /// Flip the sort direction.
    ToggleSort,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect {
                address, username, ..
            } => f
                .debug_struct("Connect")
                .field("address", address)
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Disconnect => f.write_str("Disconnect"),
            Self::Navigate(entry) => f.debug_tuple("Navigate").field(entry).finish(),
            Self::ChangeDirectory(dir) => f.debug_tuple("ChangeDirectory").field(dir).finish(),
            Self::GoUp => f.write_str("GoUp"),
            Self::Refresh => f.write_str("Refresh"),
            Self::SetSort(direction) => f.debug_tuple("SetSort").field(direction).finish(),
            Self::ToggleSort => f.write_str("ToggleSort"),
        }
    }
}

impl Command {
    /// Short name used in [`Event::OperationFailed`].
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Disconnect => "disconnect",
            Self::Navigate(_) | Self::ChangeDirectory(_) | Self::GoUp => "navigate",
            Self::Refresh => "refresh",
            Self::SetSort(_) | Self::ToggleSort => "sort",
        }
    }
}

/// A notification the session sends back to the UI.
///
/// Events flow **Core → UI**. Each carries everything the view needs to
/// redraw, so the view never has to query the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A connection was established.
    Connected {
        /// `user@host[:port]` of the new connection.
        label: String,
        /// The normalized starting listing.
        entries: Vec<Entry>,
    },
    /// The session is now disconnected.
    Disconnected,
    /// The listing was (re)loaded or re-sorted.
    DirectoryLoaded {
        entries: Vec<Entry>,
    },
    /// An operation failed. `error` is the one-line message to show.
    OperationFailed {
        operation: String,
        error: String,
    },
}

impl<C: RemoteClient> Session<C> {
    /// Runs `command` and reports the outcome as an [`Event`].
    pub async fn dispatch(&mut self, command: Command) -> Event {
        let operation = command.operation();
        let result = match command {
            Command::Connect {
                address,
                username,
                password,
            } => match self.connect(&address, &username, &password).await {
                Ok(entries) => {
                    let entries = entries.to_vec();
                    return Event::Connected {
                        label: self.label().unwrap_or_default().to_string(),
                        entries,
                    };
                }
                Err(e) => Err(e),
            },
            Command::Disconnect => {
                self.disconnect().await;
                return Event::Disconnected;
            }
            Command::Navigate(entry) => self.navigate(&entry).await.map(<[Entry]>::to_vec),
            Command::ChangeDirectory(dir) => {
                self.change_directory(&dir).await.map(<[Entry]>::to_vec)
            }
            Command::GoUp => self.go_up().await.map(<[Entry]>::to_vec),
            Command::Refresh => self.refresh().await.map(<[Entry]>::to_vec),
            Command::SetSort(direction) => Ok(self.set_sort_direction(direction).to_vec()),
            Command::ToggleSort => Ok(self.toggle_sort().to_vec()),
        };

        match result {
            Ok(entries) => Event::DirectoryLoaded { entries },
            Err(e) => Event::OperationFailed {
                operation: operation.to_string(),
                error: e.to_string(),
            },
        }
    }
}
