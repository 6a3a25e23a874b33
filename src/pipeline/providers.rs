//! Contracts of the external collaborators the pipeline consumes.
//!
//! Calls that act on behalf of the user take the access token as an explicit
//! argument; the providers never look up credentials themselves.

use std::path::Path;

use async_trait::async_trait;

use super::{Caption, ProviderError, SongQuery};
use crate::types::TokenGrant;

#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Describes the mood of the image. Never fails: on internal errors the
    /// provider returns a generic caption marked as degraded.
    async fn describe(&self, image: &Path) -> Caption;
}

#[async_trait]
pub trait SongListProvider: Send + Sync {
    /// Suggests songs for a caption, in order of preference.
    async fn suggest(&self, caption: &str) -> Result<Vec<SongQuery>, ProviderError>;
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the URI of the top-ranked track for `query`, if any.
    async fn search_track(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Option<String>, ProviderError>;
}

/// Playlist as reported by the provider right after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub id: Option<String>,
    pub url: String,
}

#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    async fn current_user_id(&self, access_token: &str) -> Result<String, ProviderError>;

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<CreatedPlaylist, ProviderError>;

    /// Appends `uris` in order. Callers keep batches within the provider's
    /// per-request limit.
    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), ProviderError>;
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ProviderError>;
}
