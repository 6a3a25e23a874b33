use super::{SpotifyClient, check_status};
use crate::{
    pipeline::{ProviderError, providers::CreatedPlaylist},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, UserProfile,
    },
};

const PLAYLIST_DESCRIPTION: &str = "Songs picked to match the mood of a photo.";

impl SpotifyClient {
    pub(crate) async fn me(&self, access_token: &str) -> Result<UserProfile, ProviderError> {
        let api_url = format!("{uri}/me", uri = self.api_url);
        let response = self.http.get(&api_url).bearer_auth(access_token).send().await?;

        Ok(check_status(response).await?.json::<UserProfile>().await?)
    }

    /// Creates a public playlist for `user_id`.
    ///
    /// Spotify always returns the id, but the public URL is what ends up in
    /// front of the user, so a response without a URL is rejected.
    pub(crate) async fn create(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<CreatedPlaylist, ProviderError> {
        let api_url = format!(
            "{uri}/users/{user_id}/playlists",
            uri = self.api_url,
            user_id = user_id
        );

        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: true,
            collaborative: false,
        };

        let response = self
            .http
            .post(&api_url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        let json = check_status(response)
            .await?
            .json::<CreatePlaylistResponse>()
            .await?;

        let url = json.external_urls.spotify.ok_or_else(|| {
            ProviderError::Invalid(format!("playlist '{}' has no public url", json.name))
        })?;

        Ok(CreatedPlaylist { id: json.id, url })
    }

    /// Adds at most 100 track URIs to a playlist in one request.
    pub(crate) async fn add_track_uris(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), ProviderError> {
        let api_url = format!(
            "{uri}/playlists/{playlist_id}/tracks",
            uri = self.api_url,
            playlist_id = playlist_id
        );

        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let response = self
            .http
            .post(&api_url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        check_status(response)
            .await?
            .json::<AddTrackToPlaylistResponse>()
            .await?;

        Ok(())
    }
}
