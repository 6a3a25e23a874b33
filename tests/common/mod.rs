#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::Write,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use photo2playlist::{
    pipeline::{
        Caption, Orchestrator, ProviderError, SongQuery,
        providers::{
            CaptionProvider, CreatedPlaylist, OAuthProvider, PlaylistProvider, SearchProvider,
            SongListProvider,
        },
    },
    types::{Token, TokenGrant},
};
use tempfile::NamedTempFile;

pub fn valid_token() -> Token {
    Token {
        access_token: "access-valid".to_string(),
        refresh_token: "refresh-1".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_at: Utc::now().timestamp() + 3600,
    }
}

pub fn expired_token() -> Token {
    Token {
        access_token: "access-expired".to_string(),
        refresh_token: "refresh-1".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_at: Utc::now().timestamp() - 10,
    }
}

pub fn image_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".jpg")
        .tempfile()
        .unwrap();
    file.write_all(b"\xFF\xD8\xFF\xE0fake jpeg").unwrap();
    file
}

fn status_error(status: u16) -> ProviderError {
    ProviderError::Status {
        status,
        body: "mock failure".to_string(),
    }
}

/// OAuth provider that hands out numbered access tokens or always fails.
pub struct MockOAuth {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub rotate_refresh_token: bool,
    pub delay: Duration,
}

impl MockOAuth {
    pub fn ok() -> Self {
        MockOAuth {
            calls: AtomicUsize::new(0),
            fail: false,
            rotate_refresh_token: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        MockOAuth {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for MockOAuth {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(status_error(400));
        }

        Ok(TokenGrant {
            access_token: format!("access-refreshed-{n}"),
            refresh_token: self
                .rotate_refresh_token
                .then(|| format!("refresh-{}", n + 1)),
            scope: None,
            expires_in: 3600,
        })
    }
}

pub struct FixedCaption(pub Caption);

#[async_trait]
impl CaptionProvider for FixedCaption {
    async fn describe(&self, _image: &Path) -> Caption {
        self.0.clone()
    }
}

pub struct FixedSongs {
    pub songs: Vec<SongQuery>,
    pub fail: bool,
}

impl FixedSongs {
    pub fn new(songs: &[&str]) -> Self {
        FixedSongs {
            songs: songs.iter().map(|s| s.to_string()).collect(),
            fail: false,
        }
    }
}

#[async_trait]
impl SongListProvider for FixedSongs {
    async fn suggest(&self, _caption: &str) -> Result<Vec<SongQuery>, ProviderError> {
        if self.fail {
            return Err(status_error(503));
        }
        Ok(self.songs.clone())
    }
}

/// What a mocked search returns for one query.
#[derive(Clone)]
pub enum SearchOutcome {
    Found(&'static str),
    NotFound,
    Fails,
}

/// Search provider answering from a table; unknown queries find nothing.
/// Records every query and the highest number of concurrent searches.
pub struct MockSearch {
    pub outcomes: HashMap<String, SearchOutcome>,
    pub queries: Mutex<Vec<String>>,
    pub tokens: Mutex<Vec<String>>,
    pub delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockSearch {
    pub fn new(outcomes: &[(&str, SearchOutcome)]) -> Self {
        MockSearch {
            outcomes: outcomes
                .iter()
                .map(|(q, o)| (q.to_string(), o.clone()))
                .collect(),
            queries: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search_track(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.tokens.lock().unwrap().push(access_token.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.outcomes.get(query) {
            Some(SearchOutcome::Found(uri)) => Ok(Some(uri.to_string())),
            Some(SearchOutcome::Fails) => Err(status_error(502)),
            Some(SearchOutcome::NotFound) | None => Ok(None),
        }
    }
}

/// Playlist provider recording every call.
pub struct MockPlaylists {
    pub user_id: String,
    pub url: String,
    pub id: Option<String>,
    pub fail_create: bool,
    pub fail_add: bool,
    pub fail_user: bool,
    pub created: Mutex<Vec<(String, String)>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockPlaylists {
    pub fn new(url: &str) -> Self {
        MockPlaylists {
            user_id: "user-1".to_string(),
            url: url.to_string(),
            id: None,
            fail_create: false,
            fail_add: false,
            fail_user: false,
            created: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn added_uris(&self) -> Vec<String> {
        self.added
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, uris)| uris.clone())
            .collect()
    }
}

#[async_trait]
impl PlaylistProvider for MockPlaylists {
    async fn current_user_id(&self, _access_token: &str) -> Result<String, ProviderError> {
        if self.fail_user {
            return Err(status_error(401));
        }
        Ok(self.user_id.clone())
    }

    async fn create_playlist(
        &self,
        _access_token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<CreatedPlaylist, ProviderError> {
        self.created
            .lock()
            .unwrap()
            .push((user_id.to_string(), name.to_string()));
        if self.fail_create {
            return Err(ProviderError::Status {
                status: 403,
                body: "<b>quota</b> exceeded".to_string(),
            });
        }

        Ok(CreatedPlaylist {
            id: self.id.clone(),
            url: self.url.clone(),
        })
    }

    async fn add_tracks(
        &self,
        _access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), ProviderError> {
        if self.fail_add {
            return Err(status_error(429));
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }
}

/// All mocks of one pipeline, kept around for assertions.
pub struct Harness {
    pub oauth: Arc<MockOAuth>,
    pub search: Arc<MockSearch>,
    pub playlists: Arc<MockPlaylists>,
    pub orchestrator: Orchestrator,
}

pub fn harness(
    caption: Caption,
    songs: FixedSongs,
    search: MockSearch,
    playlists: MockPlaylists,
) -> Harness {
    harness_with_oauth(MockOAuth::ok(), caption, songs, search, playlists)
}

pub fn harness_with_oauth(
    oauth: MockOAuth,
    caption: Caption,
    songs: FixedSongs,
    search: MockSearch,
    playlists: MockPlaylists,
) -> Harness {
    let oauth = Arc::new(oauth);
    let search = Arc::new(search);
    let playlists = Arc::new(playlists);

    let orchestrator = Orchestrator::new(
        oauth.clone(),
        Arc::new(FixedCaption(caption)),
        Arc::new(songs),
        search.clone(),
        playlists.clone(),
    );

    Harness {
        oauth,
        search,
        playlists,
        orchestrator,
    }
}
