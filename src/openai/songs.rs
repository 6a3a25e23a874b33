use async_trait::async_trait;

use super::OpenAiClient;
use crate::{
    pipeline::{MAX_SONG_QUERIES, ProviderError, SongQuery, providers::SongListProvider},
    types::{ChatCompletionRequest, ChatMessage, MessageContent},
    utils,
};

pub struct SongSuggester {
    client: OpenAiClient,
    model: String,
}

impl SongSuggester {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        SongSuggester {
            client,
            model: model.into(),
        }
    }
}

pub(crate) fn song_prompt(caption: &str) -> String {
    format!(
        "You are a music curator. Suggest {count} real songs that match the mood and \
atmosphere of this scene: \"{caption}\".\n\n\
Write one song per line, formatted exactly as \"Song Title - Artist\", for example:\n\
Bohemian Rhapsody - Queen\n\
Hotel California - Eagles\n\n\
Do not number the lines, do not use bullet points and do not add any other text.",
        count = MAX_SONG_QUERIES,
        caption = caption
    )
}

#[async_trait]
impl SongListProvider for SongSuggester {
    async fn suggest(&self, caption: &str) -> Result<Vec<SongQuery>, ProviderError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Text(song_prompt(caption)),
            }],
            temperature: 0.8,
            max_tokens: None,
        };

        let text = self.client.complete(&request).await?;
        let songs = utils::parse_song_list(&text);
        if songs.is_empty() {
            return Err(ProviderError::Invalid("no songs in completion".to_string()));
        }

        Ok(songs)
    }
}
