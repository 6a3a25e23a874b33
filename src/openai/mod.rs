//! # Chat Model Providers
//!
//! Caption and song suggestion providers backed by an OpenAI-compatible
//! `chat/completions` endpoint. Any service speaking that protocol works,
//! including local servers, by pointing `OPENAI_API_URL` at it.
//!
//! - [`VisionCaptioner`] sends the photo as a base64 data URL to a vision
//!   capable model and asks for a one-line mood description.
//! - [`SongSuggester`] asks a chat model for twenty `"Title - Artist"` lines.

mod caption;
mod songs;

pub use caption::{FALLBACK_CAPTION, MAX_CAPTION_CHARS, VisionCaptioner};
pub use songs::SongSuggester;

use reqwest::Client;

use crate::{
    config,
    pipeline::ProviderError,
    types::{ChatCompletionRequest, ChatCompletionResponse},
};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(http: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        OpenAiClient {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env(http: Client) -> Self {
        Self::new(http, config::openai_apiurl(), config::openai_api_key())
    }

    /// Sends a chat completion request and returns the text of the first
    /// choice.
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ProviderError> {
        let api_url = format!("{uri}/chat/completions", uri = self.api_url);

        let response = self
            .http
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json = response.json::<ChatCompletionResponse>().await?;
        json.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProviderError::Invalid("empty completion".to_string()))
    }
}
