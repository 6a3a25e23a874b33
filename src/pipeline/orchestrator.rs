use std::{path::Path, sync::Arc};

use tokio::sync::Mutex;

use super::{
    CredentialManager, PipelineError, PlaylistAssembler, PlaylistResult, TrackResolver,
    providers::{CaptionProvider, OAuthProvider, PlaylistProvider, SearchProvider, SongListProvider},
};
use crate::{info, session::Session, success, utils, warning};

/// Upper bound on songs resolved per run. Bounds the number of search calls
/// and the latency of one request.
pub const MAX_SONG_QUERIES: usize = 20;

pub const PLAYLIST_NAME_PREFIX: &str = "Photo2Playlist";

pub struct Orchestrator {
    credentials: CredentialManager,
    captioner: Arc<dyn CaptionProvider>,
    songs: Arc<dyn SongListProvider>,
    resolver: TrackResolver,
    assembler: PlaylistAssembler,
}

impl Orchestrator {
    pub fn new(
        oauth: Arc<dyn OAuthProvider>,
        captioner: Arc<dyn CaptionProvider>,
        songs: Arc<dyn SongListProvider>,
        search: Arc<dyn SearchProvider>,
        playlists: Arc<dyn PlaylistProvider>,
    ) -> Self {
        Orchestrator {
            credentials: CredentialManager::new(oauth),
            captioner,
            songs,
            resolver: TrackResolver::new(search),
            assembler: PlaylistAssembler::new(playlists),
        }
    }

    pub fn with_search_concurrency(mut self, concurrency: usize) -> Self {
        self.resolver = self.resolver.with_concurrency(concurrency);
        self
    }

    /// Runs the whole pipeline for one uploaded image.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NoImage`] if `image_path` is missing or not a file
    /// - [`PipelineError::AuthRequired`] if the session cannot produce a valid
    ///   token; the caller should redirect to login
    /// - [`PipelineError::SongSuggestion`] if no song list could be generated
    /// - [`PipelineError::PlaylistCreation`] if the playlist could not be
    ///   created or filled
    ///
    /// Zero resolved tracks is not an error: the result then carries
    /// `tracks_found == 0` and no URL.
    pub async fn run(
        &self,
        session: &Mutex<Session>,
        image_path: Option<&Path>,
    ) -> Result<PlaylistResult, PipelineError> {
        let image_path = match image_path {
            Some(path) if is_file(path).await => path,
            _ => return Err(PipelineError::NoImage),
        };

        let access_token = self.credentials.ensure_valid_token(session).await?;

        info!("Starting image description...");
        let caption = self.captioner.describe(image_path).await;
        if caption.degraded {
            warning!("Caption provider degraded, using fallback: {}", caption.text);
        } else {
            info!("Image description: {}", caption.text);
        }

        info!("Getting song list...");
        let mut queries = self
            .songs
            .suggest(&caption.text)
            .await
            .map_err(PipelineError::SongSuggestion)?;
        info!("Got {} songs", queries.len());
        queries.truncate(MAX_SONG_QUERIES);

        info!("Searching for tracks on Spotify...");
        let matches = self.resolver.resolve_all(&access_token, queries).await;
        let uris = utils::dedupe_uris(&matches);

        if uris.is_empty() {
            warning!("No tracks found");
            return Ok(PlaylistResult {
                url: None,
                id: None,
                tracks_found: 0,
                caption: caption.text,
                caption_degraded: caption.degraded,
                matches,
            });
        }

        info!("Creating playlist with {} tracks...", uris.len());
        let user_id = self.assembler.current_user(&access_token).await?;
        let name = playlist_name(&caption.text);
        let playlist = self
            .assembler
            .create(&access_token, &user_id, &name, &uris)
            .await?;
        success!("Playlist created: {}", playlist.url);

        Ok(PlaylistResult {
            url: Some(playlist.url),
            id: Some(playlist.id),
            tracks_found: uris.len(),
            caption: caption.text,
            caption_degraded: caption.degraded,
            matches,
        })
    }
}

pub fn playlist_name(caption: &str) -> String {
    format!("{PLAYLIST_NAME_PREFIX}: {caption}")
}

async fn is_file(path: &Path) -> bool {
    async_fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
