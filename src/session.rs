//! Explicit per-user session state.
//!
//! A [`Session`] is a plain value handed to every pipeline call. The web layer
//! owns persistence through [`SessionStore`], an in-memory map keyed by the
//! session cookie; the pipeline never reaches for ambient state.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::http::{HeaderMap, header};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::types::Token;

pub const SESSION_COOKIE: &str = "p2p_session";

/// Sessions not used for this long are evicted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Shared handle to one session. The mutex doubles as the per-session lock
/// that serializes token refresh.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Full path used for processing.
    pub path: PathBuf,
    /// Stored file name, used to build the public URL.
    pub filename: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub id: String,
    pub token: Option<Token>,
    pub image: Option<UploadedImage>,
    pub code_verifier: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Session {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_token(id: impl Into<String>, token: Token) -> Self {
        Session {
            token: Some(token),
            ..Self::new(id)
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Drops every credential, including a login still in flight.
    pub fn clear_auth(&mut self) {
        self.token = None;
        self.code_verifier = None;
    }

    pub fn clear(&mut self) {
        self.clear_auth();
        self.image = None;
    }
}

#[derive(Debug)]
struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// In-memory sessions keyed by cookie value. Every lookup refreshes the
/// session's idle timer; sessions idle for longer than the TTL are dropped by
/// [`SessionStore::evict_idle`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.handle))
    }

    /// Returns the session for `id`, or a fresh one under a new id when `id` is
    /// missing or unknown.
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, SessionHandle) {
        if let Some(id) = id {
            if let Some(handle) = self.get(id).await {
                return (id.to_string(), handle);
            }
        }

        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(Session::new(id.clone())));
        self.sessions.write().await.insert(
            id.clone(),
            Entry {
                handle: Arc::clone(&handle),
                last_seen: Instant::now(),
            },
        );
        (id, handle)
    }

    pub async fn remove(&self, id: &str) -> Option<SessionHandle> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|entry| entry.handle)
    }

    /// Drops every session idle for longer than the TTL and hands them back,
    /// so the caller can release what they reference.
    pub async fn evict_idle(&self) -> Vec<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let idle: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_seen) > self.ttl)
            .map(|(id, _)| id.clone())
            .collect();

        idle.iter()
            .filter_map(|id| sessions.remove(id))
            .map(|entry| entry.handle)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Extracts the session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
