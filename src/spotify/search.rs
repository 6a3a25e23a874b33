use super::{SpotifyClient, check_status};
use crate::{pipeline::ProviderError, types::SearchResponse};

impl SpotifyClient {
    /// Searches tracks with the full `"Title - Artist"` text and returns the
    /// URI of the top-ranked hit.
    ///
    /// No similarity threshold is applied on top of Spotify's own ranking, so
    /// an unrelated song may come back for an obscure query.
    ///
    /// # API Endpoint
    ///
    /// `GET /search?q={query}&type=track&limit=1`
    pub(crate) async fn search_track_uri(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Option<String>, ProviderError> {
        let api_url = format!("{uri}/search", uri = self.api_url);

        let response = self
            .http
            .get(&api_url)
            .bearer_auth(access_token)
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await?;

        let json = check_status(response).await?.json::<SearchResponse>().await?;

        Ok(json
            .tracks
            .and_then(|page| page.items.into_iter().next())
            .map(|track| track.uri))
    }
}
