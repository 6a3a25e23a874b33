//! # Playlist Generation Pipeline
//!
//! The pipeline converts one uploaded image into a Spotify playlist:
//!
//! ```text
//! Orchestrator
//!     ├── Credential Manager   (ensure a valid access token)
//!     ├── Caption Provider     (image -> mood caption)
//!     ├── Song List Provider   (caption -> "Title - Artist" lines)
//!     ├── Track Resolver       (line -> track URI, N independent searches)
//!     └── Playlist Assembler   (URIs -> playlist URL and id)
//! ```
//!
//! Every stage starts only after its predecessor produced a value. Failures
//! that affect a single song are absorbed and show up as a lower
//! `tracks_found`; failures that affect the whole request (no image, no
//! authorization, song suggestion, playlist creation) short-circuit the run.
//!
//! External services are reached through the traits in [`providers`], so the
//! captioning backend, the song suggester and the music service are all
//! interchangeable. Concrete implementations live in [`crate::openai`] and
//! [`crate::spotify`].

mod assembler;
mod credentials;
mod error;
mod orchestrator;
pub mod providers;
mod resolver;

pub use assembler::{AssembledPlaylist, MAX_TRACKS_PER_REQUEST, PlaylistAssembler};
pub use credentials::{CredentialManager, DEFAULT_EXPIRY_MARGIN_SECS};
pub use error::{AuthRequired, PipelineError, ProviderError};
pub use orchestrator::{MAX_SONG_QUERIES, Orchestrator, PLAYLIST_NAME_PREFIX, playlist_name};
pub use resolver::{DEFAULT_SEARCH_CONCURRENCY, TrackResolver};

use serde::Serialize;

/// A single candidate song expressed as `"Title - Artist"`.
pub type SongQuery = String;

/// Mood description of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    pub text: String,
    /// Set when the provider could not describe the image and returned its
    /// generic fallback instead.
    pub degraded: bool,
}

impl Caption {
    pub fn new(text: impl Into<String>) -> Self {
        Caption {
            text: text.into(),
            degraded: false,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Caption {
            text: text.into(),
            degraded: true,
        }
    }
}

/// Outcome of resolving one [`SongQuery`]; `uri` is `None` when nothing
/// acceptable was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMatch {
    pub query: SongQuery,
    pub uri: Option<String>,
}

impl TrackMatch {
    pub fn is_resolved(&self) -> bool {
        self.uri.is_some()
    }
}

/// Terminal artifact of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistResult {
    pub url: Option<String>,
    pub id: Option<String>,
    /// Number of distinct tracks added to the playlist.
    pub tracks_found: usize,
    pub caption: String,
    pub caption_degraded: bool,
    pub matches: Vec<TrackMatch>,
}
