use std::path::Path;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};

use super::OpenAiClient;
use crate::{
    pipeline::{Caption, ProviderError, providers::CaptionProvider},
    types::{ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl, MessageContent},
    utils, warning,
};

pub const MAX_CAPTION_CHARS: usize = 80;

/// Used whenever the image cannot be described.
pub const FALLBACK_CAPTION: &str = "a peaceful everyday scene";

const CAPTION_PROMPT: &str = "Describe the scene and mood of this photo in one short sentence \
of at most 80 characters. Reply with the sentence only.";

pub struct VisionCaptioner {
    client: OpenAiClient,
    model: String,
}

impl VisionCaptioner {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        VisionCaptioner {
            client,
            model: model.into(),
        }
    }

    async fn caption(&self, image: &Path) -> Result<String, ProviderError> {
        let bytes = async_fs::read(image).await?;
        let data_url = format!(
            "data:{mime};base64,{data}",
            mime = utils::image_mime_type(image),
            data = STANDARD.encode(bytes)
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: CAPTION_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ]),
            }],
            temperature: 0.2,
            max_tokens: Some(60),
        };

        let text = self.client.complete(&request).await?;
        Ok(clean_caption(&text))
    }
}

/// Strips wrapping quotes and enforces the length limit.
fn clean_caption(text: &str) -> String {
    let text = text.trim().trim_matches(['"', '\'']).trim();
    utils::truncate_chars(text, MAX_CAPTION_CHARS).trim_end().to_string()
}

#[async_trait]
impl CaptionProvider for VisionCaptioner {
    async fn describe(&self, image: &Path) -> Caption {
        match self.caption(image).await {
            Ok(text) if !text.is_empty() => Caption::new(text),
            Ok(_) => {
                warning!("Empty caption for {}", image.display());
                Caption::fallback(FALLBACK_CAPTION)
            }
            Err(e) => {
                warning!("Error describing image {}: {}", image.display(), e);
                Caption::fallback(FALLBACK_CAPTION)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_caption_strips_quotes() {
        assert_eq!(
            clean_caption("\"a calm sunset over water\"\n"),
            "a calm sunset over water"
        );
    }

    #[test]
    fn clean_caption_limits_length() {
        let long = "a".repeat(200);
        assert_eq!(clean_caption(&long).chars().count(), MAX_CAPTION_CHARS);
    }
}
