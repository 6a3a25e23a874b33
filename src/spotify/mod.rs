//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by the
//! playlist pipeline: OAuth (authorization code with PKCE, token refresh),
//! track search and playlist management. [`SpotifyClient`] implements the
//! [`SearchProvider`], [`PlaylistProvider`] and [`OAuthProvider`] traits.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (Orchestrator, Credential Manager)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE, refresh)
//!     ├── Search (best track match for "Title - Artist")
//!     └── Playlist Operations (Create, Add tracks)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user, the owner of created playlists
//! - `GET /search` - Track search, limited to the top result
//! - `POST /users/{user_id}/playlists` - Create new playlists
//! - `POST /playlists/{playlist_id}/tracks` - Add tracks to playlists
//! - `POST /api/token` - Token exchange and refresh operations
//!
//! ## Error Handling
//!
//! Non-success responses are turned into [`ProviderError::Status`] carrying
//! the status code and response body. Nothing is retried here; the pipeline
//! decides what a failure means.

pub mod auth;
mod playlist;
mod search;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::{
    config,
    pipeline::{
        ProviderError,
        providers::{CreatedPlaylist, OAuthProvider, PlaylistProvider, SearchProvider},
    },
    types::TokenGrant,
};

/// Endpoints and OAuth client settings of the Spotify integration.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
}

impl SpotifyConfig {
    pub fn from_env() -> Self {
        SpotifyConfig {
            api_url: config::spotify_apiurl(),
            auth_url: config::spotify_apiauth_url(),
            token_url: config::spotify_apitoken_url(),
            client_id: config::spotify_client_id(),
            client_secret: config::spotify_client_secret(),
            redirect_uri: config::spotify_redirect_uri(),
            scope: config::spotify_scope(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    auth_url: String,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
    scope: String,
}

impl SpotifyClient {
    pub fn new(http: Client, config: SpotifyConfig) -> Self {
        SpotifyClient {
            http,
            api_url: config.api_url,
            auth_url: config.auth_url,
            token_url: config.token_url,
            client_id: config.client_id,
            client_secret: config.client_secret,
            redirect_uri: config.redirect_uri,
            scope: config.scope,
        }
    }

    pub fn from_env(http: Client) -> Self {
        Self::new(http, SpotifyConfig::from_env())
    }
}

/// Passes successful responses through and turns everything else into
/// [`ProviderError::Status`].
async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SearchProvider for SpotifyClient {
    async fn search_track(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.search_track_uri(access_token, query).await
    }
}

#[async_trait]
impl PlaylistProvider for SpotifyClient {
    async fn current_user_id(&self, access_token: &str) -> Result<String, ProviderError> {
        self.me(access_token).await.map(|user| user.id)
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<CreatedPlaylist, ProviderError> {
        self.create(access_token, user_id, name).await
    }

    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), ProviderError> {
        self.add_track_uris(access_token, playlist_id, uris).await
    }
}

#[async_trait]
impl OAuthProvider for SpotifyClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ProviderError> {
        self.refresh_token(refresh_token).await
    }
}
