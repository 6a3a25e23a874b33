use std::sync::Arc;

use super::{PipelineError, providers::PlaylistProvider};
use crate::{info, utils};

/// Maximum number of track URIs the provider accepts per add request.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPlaylist {
    pub url: String,
    pub id: String,
}

/// Creates a playlist and fills it with already resolved tracks.
///
/// Creation is not idempotent, so nothing here is retried: the first failure
/// is reported as [`PipelineError::PlaylistCreation`].
#[derive(Clone)]
pub struct PlaylistAssembler {
    provider: Arc<dyn PlaylistProvider>,
}

impl PlaylistAssembler {
    pub fn new(provider: Arc<dyn PlaylistProvider>) -> Self {
        PlaylistAssembler { provider }
    }

    /// Id of the user the access token belongs to, i.e. the playlist owner.
    pub async fn current_user(&self, access_token: &str) -> Result<String, PipelineError> {
        self.provider
            .current_user_id(access_token)
            .await
            .map_err(|e| PipelineError::PlaylistCreation(e.to_string()))
    }

    /// Creates a playlist named `name` for `user_id` and adds `uris` in order,
    /// chunked to [`MAX_TRACKS_PER_REQUEST`].
    ///
    /// `uris` is used as given; deduplication and truncation are the caller's
    /// job.
    pub async fn create(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
        uris: &[String],
    ) -> Result<AssembledPlaylist, PipelineError> {
        let created = self
            .provider
            .create_playlist(access_token, user_id, name)
            .await
            .map_err(|e| PipelineError::PlaylistCreation(e.to_string()))?;

        let id = created
            .id
            .filter(|id| !id.is_empty())
            .or_else(|| utils::playlist_id_from_url(&created.url))
            .ok_or_else(|| {
                PipelineError::PlaylistCreation(format!(
                    "cannot determine playlist id from '{}'",
                    created.url
                ))
            })?;

        for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
            self.provider
                .add_tracks(access_token, &id, chunk)
                .await
                .map_err(|e| PipelineError::PlaylistCreation(e.to_string()))?;
        }

        info!("Added {} tracks to playlist {}", uris.len(), id);
        Ok(AssembledPlaylist {
            url: created.url,
            id,
        })
    }
}
