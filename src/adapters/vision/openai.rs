use super::{extract_text, send_json, BackendConfig};
use crate::domain::model::ImagePayload;
use crate::domain::ports::VisionBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Chat-completions style backend. Serves OpenAI and Groq, which differ only in
/// endpoint and the order of the image and text parts.
pub struct OpenAiCompatibleBackend {
    name: &'static str,
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    image_first: bool,
}

impl OpenAiCompatibleBackend {
    pub fn openai(client: Client, config: &BackendConfig) -> Self {
        Self::build("openai", client, config, false)
    }

    pub fn groq(client: Client, config: &BackendConfig) -> Self {
        Self::build("groq", client, config, true)
    }

    fn build(name: &'static str, client: Client, config: &BackendConfig, image_first: bool) -> Self {
        Self {
            name,
            client,
            endpoint: config.endpoint().to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens(),
            image_first,
        }
    }

    fn request_body(&self, image: &ImagePayload, prompt: &str) -> Value {
        let text = json!({"type": "text", "text": prompt});
        let picture = json!({"type": "image_url", "image_url": {"url": image.data_url()}});
        let content = if self.image_first {
            vec![picture, text]
        } else {
            vec![text, picture]
        };

        json!({
            "model": self.model,
            "messages": [{"role": "user", "content": content}],
            "max_tokens": self.max_tokens,
        })
    }
}

#[async_trait]
impl VisionBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, image: &ImagePayload, prompt: &str) -> Result<String> {
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image, prompt));

        let body = send_json(self.name, request).await?;
        extract_text(self.name, &body, "/choices/0/message/content")
    }
}
