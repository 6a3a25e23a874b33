//! Configuration management for Photo to Playlist.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify and OpenAI credentials, server settings, and
//! other runtime parameters.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use reqwest::Client;

use crate::{
    openai::{OpenAiClient, SongSuggester, VisionCaptioner},
    pipeline::{DEFAULT_SEARCH_CONCURRENCY, Orchestrator},
    session::DEFAULT_SESSION_TTL,
    spotify::SpotifyClient,
};

const APP_DIR: &str = "photo2playlist";

/// Loads environment variables from `.env` files.
///
/// Looks for `photo2playlist/.env` in the platform-specific local data
/// directory first, then for a `.env` in the working directory. Variables
/// already present in the process environment are never overwritten.
/// Missing files are not an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/photo2playlist/.env`
/// - macOS: `~/Library/Application Support/photo2playlist/.env`
/// - Windows: `%LOCALAPPDATA%/photo2playlist/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(&path).ok();
    dotenv::dotenv().ok();
    Ok(())
}

/// Local data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Returns the address the HTTP server binds to, e.g. `127.0.0.1:8080`.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret, if one is configured.
///
/// The PKCE flow works without it; when present it is sent with token
/// requests as HTTP basic auth.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Returns the redirect URI registered with Spotify, e.g.
/// `http://127.0.0.1:8080/callback`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE")
        .unwrap_or_else(|_| "playlist-modify-public playlist-modify-private".to_string())
}

pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the API key for the chat completion service.
///
/// # Panics
///
/// Panics if the `OPENAI_API_KEY` environment variable is not set.
///
/// # Security Note
///
/// The key should be kept confidential and never exposed in logs or version
/// control.
pub fn openai_api_key() -> String {
    env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set")
}

pub fn openai_apiurl() -> String {
    env::var("OPENAI_API_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
}

pub fn openai_chat_model() -> String {
    env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string())
}

pub fn openai_vision_model() -> String {
    env::var("OPENAI_VISION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

/// Directory uploaded images are stored in and served from.
pub fn upload_dir() -> PathBuf {
    env::var("UPLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("uploads"))
}

/// Number of track searches allowed in flight at once.
pub fn search_concurrency() -> usize {
    env::var("SEARCH_CONCURRENCY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SEARCH_CONCURRENCY)
}

/// Idle time after which a web session and its uploaded image are dropped.
pub fn session_ttl() -> Duration {
    env::var("SESSION_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SESSION_TTL)
}

/// Timeout applied to every outgoing HTTP request.
pub fn http_timeout() -> Duration {
    let secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}

/// Shared HTTP client for all providers.
pub fn http_client() -> Client {
    Client::builder()
        .timeout(http_timeout())
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Wires the pipeline with the configured providers.
pub fn build_orchestrator() -> Orchestrator {
    let http = http_client();
    let spotify = Arc::new(SpotifyClient::from_env(http.clone()));
    let openai = OpenAiClient::from_env(http);

    Orchestrator::new(
        spotify.clone(),
        Arc::new(VisionCaptioner::new(openai.clone(), openai_vision_model())),
        Arc::new(SongSuggester::new(openai, openai_chat_model())),
        spotify.clone(),
        spotify,
    )
    .with_search_concurrency(search_concurrency())
}
