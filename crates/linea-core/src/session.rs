//! Connection lifecycle and directory navigation.
//!
//! A [`Session`] owns one [`RemoteClient`] and is the single source of truth
//! for what a view shows: the connection state, the current normalized
//! listing, and the message of the last failed operation.
//!
//! The session keeps no path of its own. "Current directory" lives on the
//! server; navigating to `..` just forwards the segment to the client.
//!
//! Operations take `&mut self`, so at most one is in flight per session.

use crate::config::Config;
use crate::entry::Entry;
use crate::error::{CoreError, CoreResult};
use crate::listing::{normalize, SortDirection};
use crate::remote::{Address, ConnectConfig, RemoteClient, RemoteError, DEFAULT_PORT};

/// Whether the session holds a live connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// A browsing session against one remote server.
///
/// ```no_run
/// use linea_core::{FtpClient, Session};
///
/// # async fn run() -> linea_core::CoreResult<()> {
/// let mut session = Session::new(FtpClient::new());
/// let entries = session.connect("ftp.example.com", "anonymous", "").await?;
/// assert_eq!(entries[0].name(), "..");
/// session.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct Session<C> {
    client: C,
    state: ConnectionState,
    entries: Vec<Entry>,
    last_error: Option<String>,
    sort: SortDirection,
    default_port: u16,
    label: Option<String>,
}

impl<C: RemoteClient> Session<C> {
    /// Creates a disconnected session with ascending sort and port 21 as
    /// the default.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: ConnectionState::Disconnected,
            entries: Vec::new(),
            last_error: None,
            sort: SortDirection::default(),
            default_port: DEFAULT_PORT,
            label: None,
        }
    }

    /// Creates a disconnected session using the sort direction and default
    /// port from `config`.
    pub fn with_config(client: C, config: &Config) -> Self {
        Self {
            sort: config.listing.sort,
            default_port: config.connection.default_port,
            ..Self::new(client)
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The current listing. Empty while disconnected; otherwise starts with
    /// the parent entry.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Message of the most recent failed operation, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort
    }

    /// `user@host[:port]` of the live connection.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    #[cfg(test)]
    pub(crate) fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Connects and loads the server's starting directory.
    ///
    /// `address` is `host` or `host:port`; credentials are passed through
    /// untouched. A live connection is closed first. On failure the session
    /// is left disconnected with an empty listing and `last_error` holding
    /// the error's message.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidAddress`] if `address` cannot be parsed.
    /// - [`CoreError::Remote`] if the client fails to connect, log in or list.
    pub async fn connect(
        &mut self,
        address: &str,
        username: &str,
        password: &str,
    ) -> CoreResult<&[Entry]> {
        if self.is_connected() {
            self.disconnect().await;
        }

        let config = match Address::parse(address, self.default_port) {
            Ok(addr) => ConnectConfig::new(addr, username, password),
            Err(e) => {
                tracing::warn!("Rejected address {address:?}");
                return Err(self.fail_connect(e));
            }
        };

        match self.client.open(&config).await {
            Ok(raw) => {
                let label = config.display_label();
                tracing::info!("Connected to {label} ({} entries)", raw.len());
                self.entries = normalize(raw, self.sort);
                self.state = ConnectionState::Connected;
                self.last_error = None;
                self.label = Some(label);
                Ok(&self.entries)
            }
            Err(e) => {
                tracing::warn!("Connection to {} failed: {e}", config.display_label());
                Err(self.fail_connect(e.into()))
            }
        }
    }

    /// Closes the connection and clears the listing and error.
    ///
    /// Never fails: a teardown error from the client is logged and
    /// otherwise ignored, so the caller always ends up disconnected.
    pub async fn disconnect(&mut self) {
        if self.is_connected() {
            if let Err(e) = self.client.close().await {
                tracing::warn!(
                    "Ignoring error while disconnecting from {}: {e}",
                    self.label.as_deref().unwrap_or("server")
                );
            } else {
                tracing::info!("Disconnected from {}", self.label.as_deref().unwrap_or("server"));
            }
        }
        self.reset();
    }

    /// Activates an entry from the current listing.
    ///
    /// Files are ignored and the current listing is returned unchanged.
    /// For a directory the entry name, including a literal `..`, is sent to
    /// the client as a relative path and the resulting listing replaces the
    /// current one. On failure the previous listing stays in place.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotConnected`] if called while disconnected.
    /// - [`CoreError::Remote`] if the directory change or listing fails.
    pub async fn navigate(&mut self, target: &Entry) -> CoreResult<&[Entry]> {
        self.ensure_connected("navigate")?;
        if !target.is_dir() {
            return Ok(&self.entries);
        }

        tracing::debug!("Changing directory to {:?}", target.name());
        let result = self.client.change_directory_and_list(target.name()).await;
        self.apply_listing(result, "navigate")
    }

    /// Changes into `directory`, an opaque path segment.
    ///
    /// # Errors
    ///
    /// Same as [`Session::navigate`].
    pub async fn change_directory(&mut self, directory: &str) -> CoreResult<&[Entry]> {
        self.navigate(&Entry::directory(directory, "")).await
    }

    /// Moves to the parent directory.
    ///
    /// # Errors
    ///
    /// Same as [`Session::navigate`].
    pub async fn go_up(&mut self) -> CoreResult<&[Entry]> {
        self.navigate(&Entry::parent()).await
    }

    /// Re-lists the current remote directory.
    ///
    /// # Errors
    ///
    /// Same as [`Session::navigate`].
    pub async fn refresh(&mut self) -> CoreResult<&[Entry]> {
        self.ensure_connected("refresh")?;
        let result = self.client.list(None).await;
        self.apply_listing(result, "refresh")
    }

    /// Changes the sort direction and re-sorts the current listing.
    pub fn set_sort_direction(&mut self, direction: SortDirection) -> &[Entry] {
        self.sort = direction;
        if !self.entries.is_empty() {
            let current = std::mem::take(&mut self.entries);
            self.entries = normalize(current, direction);
        }
        &self.entries
    }

    /// Flips the sort direction and re-sorts the current listing.
    pub fn toggle_sort(&mut self) -> &[Entry] {
        let direction = self.sort.toggled();
        self.set_sort_direction(direction)
    }

    fn ensure_connected(&self, operation: &str) -> CoreResult<()> {
        if self.is_connected() {
            return Ok(());
        }
        tracing::error!("{operation} called on a disconnected session");
        Err(CoreError::NotConnected)
    }

    fn apply_listing(
        &mut self,
        result: Result<Vec<Entry>, RemoteError>,
        operation: &str,
    ) -> CoreResult<&[Entry]> {
        match result {
            Ok(raw) => {
                self.entries = normalize(raw, self.sort);
                self.last_error = None;
                Ok(&self.entries)
            }
            Err(e) => {
                tracing::warn!("{operation} failed: {e}");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn fail_connect(&mut self, err: CoreError) -> CoreError {
        self.reset();
        self.last_error = Some(err.to_string());
        err
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.entries.clear();
        self.last_error = None;
        self.label = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use crate::entry::EntryKind;

    type Listing = Result<Vec<Entry>, RemoteError>;

    /// A scripted client: each call pops the next queued result and is
    /// recorded in `calls`.
    #[derive(Default)]
    pub(crate) struct MockClient {
        pub open_results: VecDeque<Listing>,
        pub cd_results: VecDeque<Listing>,
        pub list_results: VecDeque<Listing>,
        pub close_error: Option<RemoteError>,
        pub calls: Vec<String>,
        pub opened: Vec<(String, u16, String, String)>,
    }

    impl MockClient {
        pub(crate) fn opening(listing: Vec<Entry>) -> Self {
            let mut client = Self::default();
            client.open_results.push_back(Ok(listing));
            client
        }
    }

    #[async_trait]
    impl RemoteClient for MockClient {
        async fn open(&mut self, config: &ConnectConfig) -> Result<Vec<Entry>, RemoteError> {
            self.calls.push("open".to_string());
            self.opened.push((
                config.host.clone(),
                config.port,
                config.username.clone(),
                config.password.clone(),
            ));
            self.open_results
                .pop_front()
                .unwrap_or(Err(RemoteError::Unreachable("no script".into())))
        }

        async fn close(&mut self) -> Result<(), RemoteError> {
            self.calls.push("close".to_string());
            match self.close_error.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        async fn list(&mut self, path: Option<&str>) -> Result<Vec<Entry>, RemoteError> {
            self.calls.push(format!("list {}", path.unwrap_or("<cwd>")));
            self.list_results
                .pop_front()
                .unwrap_or(Err(RemoteError::Protocol("no script".into())))
        }

        async fn change_directory_and_list(
            &mut self,
            segment: &str,
        ) -> Result<Vec<Entry>, RemoteError> {
            self.calls.push(format!("cd {segment}"));
            self.cd_results
                .pop_front()
                .unwrap_or(Err(RemoteError::Protocol("no script".into())))
        }
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(Entry::name).collect()
    }

    async fn connected_with(listing: Vec<Entry>) -> Session<MockClient> {
        let mut session = Session::new(MockClient::opening(listing));
        session.connect("10.0.0.1:21", "u", "p").await.unwrap();
        session
    }

    #[test]
    fn new_session_is_disconnected_and_empty() {
        let session = Session::new(MockClient::default());
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.entries().is_empty());
        assert!(session.last_error().is_none());
        assert!(session.label().is_none());
    }

    #[tokio::test]
    async fn connect_normalizes_initial_listing() {
        let mut session = Session::new(MockClient::opening(vec![
            Entry::file("b.txt", 10, "2024-01-01"),
            Entry::directory("a", "2024-01-01"),
        ]));

        let entries = session.connect("10.0.0.1:21", "u", "p").await.unwrap();
        assert_eq!(names(entries), vec!["..", "a", "b.txt"]);
        assert_eq!(entries[0].kind(), EntryKind::Directory);

        assert_eq!(session.state(), ConnectionState::Connected);
        assert!(session.last_error().is_none());
        assert_eq!(session.label(), Some("u@10.0.0.1"));
    }

    #[tokio::test]
    async fn connect_forwards_address_and_credentials() {
        let mut session = Session::new(MockClient::opening(Vec::new()));
        session.connect("ftp.example.com", "anon", "pa ss").await.unwrap();

        let opened = &session.client().opened;
        assert_eq!(
            opened,
            &vec![(
                "ftp.example.com".to_string(),
                21,
                "anon".to_string(),
                "pa ss".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn connect_makes_exactly_one_attempt() {
        let mut client = MockClient::default();
        client
            .open_results
            .push_back(Err(RemoteError::Unreachable("timed out".into())));
        client.open_results.push_back(Ok(Vec::new()));
        let mut session = Session::new(client);

        assert!(session.connect("host", "u", "p").await.is_err());
        assert_eq!(session.client().calls, vec!["open"]);
    }

    #[tokio::test]
    async fn connect_auth_failure_stays_disconnected() {
        let mut client = MockClient::default();
        client
            .open_results
            .push_back(Err(RemoteError::Auth("bad credentials".into())));
        let mut session = Session::new(client);

        let err = session.connect("10.0.0.1:21", "u", "wrong").await.unwrap_err();
        assert!(matches!(err, CoreError::Remote(RemoteError::Auth(_))));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.entries().is_empty());
        assert_eq!(session.last_error(), Some("bad credentials"));
    }

    #[tokio::test]
    async fn connect_invalid_address_never_reaches_client() {
        let mut session = Session::new(MockClient::default());

        let err = session.connect("host:port", "u", "p").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidAddress(_)));
        assert_eq!(session.last_error(), Some("invalid address: host:port"));
        assert!(session.client().calls.is_empty());
    }

    #[tokio::test]
    async fn connect_uses_configured_default_port() {
        let mut config = Config::default();
        config.connection.default_port = 2121;
        let mut session = Session::with_config(MockClient::opening(Vec::new()), &config);

        session.connect("example.com", "u", "p").await.unwrap();
        assert_eq!(session.client().opened[0].1, 2121);
        assert_eq!(session.label(), Some("u@example.com:2121"));
    }

    #[tokio::test]
    async fn connect_while_connected_closes_first() {
        let mut client = MockClient::opening(vec![Entry::file("old", 1, "")]);
        client.open_results.push_back(Ok(vec![Entry::file("new", 1, "")]));
        let mut session = Session::new(client);

        session.connect("one", "u", "p").await.unwrap();
        let entries = session.connect("two", "u", "p").await.unwrap();
        assert_eq!(names(entries), vec!["..", "new"]);
        assert_eq!(session.client().calls, vec!["open", "close", "open"]);
    }

    #[tokio::test]
    async fn successful_connect_clears_previous_error() {
        let mut client = MockClient::default();
        client
            .open_results
            .push_back(Err(RemoteError::Auth("bad credentials".into())));
        client.open_results.push_back(Ok(Vec::new()));
        let mut session = Session::new(client);

        let _ = session.connect("host", "u", "x").await;
        assert!(session.last_error().is_some());
        session.connect("host", "u", "p").await.unwrap();
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn disconnect_clears_state() {
        let mut session = connected_with(vec![Entry::directory("docs", "")]).await;

        session.disconnect().await;
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.entries().is_empty());
        assert!(session.last_error().is_none());
        assert!(session.label().is_none());
        assert_eq!(session.client().calls, vec!["open", "close"]);
    }

    #[tokio::test]
    async fn disconnect_swallows_transport_errors() {
        let mut session = connected_with(vec![Entry::directory("docs", "")]).await;
        session.client.close_error = Some(RemoteError::Unreachable("broken pipe".into()));

        session.disconnect().await;
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.entries().is_empty());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn disconnect_when_disconnected_skips_client() {
        let mut session = Session::new(MockClient::default());
        session.disconnect().await;
        assert!(session.client().calls.is_empty());
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn navigate_into_directory_replaces_listing() {
        let mut session = connected_with(vec![Entry::directory("docs", "")]).await;
        assert_eq!(names(session.entries()), vec!["..", "docs"]);
        session
            .client
            .cd_results
            .push_back(Ok(vec![Entry::file("x.pdf", 3, "")]));

        let docs = session.entries()[1].clone();
        let entries = session.navigate(&docs).await.unwrap();
        assert_eq!(names(entries), vec!["..", "x.pdf"]);
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn navigate_parent_passes_dotdot_verbatim() {
        let mut session = connected_with(Vec::new()).await;
        session.client.cd_results.push_back(Ok(Vec::new()));

        let parent = session.entries()[0].clone();
        session.navigate(&parent).await.unwrap();
        assert_eq!(session.client().calls, vec!["open", "cd .."]);
    }

    #[tokio::test]
    async fn navigate_file_is_noop() {
        let mut session = connected_with(vec![Entry::file("readme.md", 10, "")]).await;
        let before = session.entries().to_vec();

        let file = before[1].clone();
        let entries = session.navigate(&file).await.unwrap();
        assert_eq!(entries, before.as_slice());
        assert_eq!(session.client().calls, vec!["open"]);
    }

    #[tokio::test]
    async fn navigate_failure_keeps_previous_listing() {
        let mut session = connected_with(vec![Entry::directory("locked", "")]).await;
        session
            .client
            .cd_results
            .push_back(Err(RemoteError::Protocol("550 Permission denied".into())));
        let before = session.entries().to_vec();

        let err = session.change_directory("locked").await.unwrap_err();
        assert!(matches!(err, CoreError::Remote(RemoteError::Protocol(_))));
        assert_eq!(session.entries(), before.as_slice());
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.last_error(), Some("550 Permission denied"));
    }

    #[tokio::test]
    async fn navigate_success_clears_error() {
        let mut session = connected_with(vec![Entry::directory("a", "")]).await;
        session
            .client
            .cd_results
            .push_back(Err(RemoteError::Protocol("timeout".into())));
        session.client.cd_results.push_back(Ok(Vec::new()));

        let _ = session.change_directory("a").await;
        assert!(session.last_error().is_some());
        session.change_directory("a").await.unwrap();
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn navigate_while_disconnected_is_contract_error() {
        let mut session = Session::new(MockClient::default());

        let err = session.navigate(&Entry::directory("docs", "")).await.unwrap_err();
        assert!(matches!(err, CoreError::NotConnected));
        assert!(session.client().calls.is_empty());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn go_up_sends_parent_segment() {
        let mut session = connected_with(Vec::new()).await;
        session
            .client
            .cd_results
            .push_back(Ok(vec![Entry::directory("home", "")]));

        let entries = session.go_up().await.unwrap();
        assert_eq!(names(entries), vec!["..", "home"]);
        assert_eq!(session.client().calls.last().map(String::as_str), Some("cd .."));
    }

    #[tokio::test]
    async fn refresh_relists_current_directory() {
        let mut session = connected_with(vec![Entry::file("a", 1, "")]).await;
        session
            .client
            .list_results
            .push_back(Ok(vec![Entry::file("a", 1, ""), Entry::file("b", 1, "")]));

        let entries = session.refresh().await.unwrap();
        assert_eq!(names(entries), vec!["..", "a", "b"]);
        assert_eq!(session.client().calls, vec!["open", "list <cwd>"]);
    }

    #[tokio::test]
    async fn refresh_while_disconnected_is_contract_error() {
        let mut session = Session::new(MockClient::default());
        assert!(matches!(
            session.refresh().await.unwrap_err(),
            CoreError::NotConnected
        ));
    }

    #[tokio::test]
    async fn set_sort_direction_keeps_parent_first() {
        let mut session = connected_with(vec![
            Entry::file("a", 1, ""),
            Entry::file("c", 1, ""),
            Entry::file("b", 1, ""),
        ])
        .await;

        let entries = session.set_sort_direction(SortDirection::Descending);
        assert_eq!(names(entries), vec!["..", "c", "b", "a"]);

        let entries = session.set_sort_direction(SortDirection::Ascending);
        assert_eq!(names(entries), vec!["..", "a", "b", "c"]);
    }

    #[tokio::test]
    async fn toggle_sort_flips_direction() {
        let mut session =
            connected_with(vec![Entry::file("a", 1, ""), Entry::file("b", 1, "")]).await;

        let entries = session.toggle_sort();
        assert_eq!(names(entries), vec!["..", "b", "a"]);
        assert_eq!(session.sort_direction(), SortDirection::Descending);

        let entries = session.toggle_sort();
        assert_eq!(names(entries), vec!["..", "a", "b"]);
        assert_eq!(session.sort_direction(), SortDirection::Ascending);
    }

    #[tokio::test]
    async fn configured_descending_sort_applies_to_listings() {
        let mut config = Config::default();
        config.listing.sort = SortDirection::Descending;
        let client = MockClient::opening(vec![Entry::file("a", 1, ""), Entry::file("b", 1, "")]);
        let mut session = Session::with_config(client, &config);

        let entries = session.connect("host", "u", "p").await.unwrap();
        assert_eq!(names(entries), vec!["..", "b", "a"]);
    }

    #[test]
    fn set_sort_direction_while_disconnected_stays_empty() {
        let mut session = Session::new(MockClient::default());
        assert!(session.set_sort_direction(SortDirection::Descending).is_empty());
        assert_eq!(session.sort_direction(), SortDirection::Descending);
    }
}
