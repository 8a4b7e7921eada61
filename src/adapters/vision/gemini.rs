use super::{extract_text, send_json, BackendConfig};
use crate::domain::model::ImagePayload;
use crate::domain::ports::VisionBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub struct GeminiBackend {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl GeminiBackend {
    pub fn new(client: Client, config: &BackendConfig) -> Self {
        let url = format!(
            "{}/{}:generateContent",
            config.endpoint().trim_end_matches('/'),
            config.model
        );
        Self {
            client,
            url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens(),
        }
    }

    fn request_body(&self, image: &ImagePayload, prompt: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"inline_data": {"mime_type": image.media_type, "data": image.base64}},
                    {"text": prompt}
                ]
            }],
            "generationConfig": {
                "temperature": 1,
                "topP": 0.95,
                "topK": 40,
                "maxOutputTokens": self.max_tokens,
                "responseMimeType": "text/plain"
            }
        })
    }
}

#[async_trait]
impl VisionBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, image: &ImagePayload, prompt: &str) -> Result<String> {
        let request = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&self.request_body(image, prompt));

        let body = send_json(self.name(), request).await?;
        extract_text(self.name(), &body, "/candidates/0/content/parts/0/text")
    }
}
