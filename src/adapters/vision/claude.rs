use super::{extract_text, send_json, BackendConfig};
use crate::domain::model::ImagePayload;
use crate::domain::ports::VisionBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeBackend {
    pub fn new(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint().to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens(),
        }
    }

    fn request_body(&self, image: &ImagePayload, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": prompt},
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": image.media_type,
                            "data": image.base64,
                        }
                    }
                ]
            }]
        })
    }
}

#[async_trait]
impl VisionBackend for ClaudeBackend {
    fn name(&self) -> &str {
        "claude"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, image: &ImagePayload, prompt: &str) -> Result<String> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.request_body(image, prompt));

        let body = send_json(self.name(), request).await?;
        extract_text(self.name(), &body, "/content/0/text")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::vision::BackendKind;

    #[test]
    fn test_request_body_uses_base64_source() {
        let config = BackendConfig::new(BackendKind::Claude, "claude-3-opus", "k");
        let backend = ClaudeBackend::new(Client::new(), &config);
        let image = ImagePayload {
            base64: "cG5n".to_string(),
            media_type: "image/png",
        };

        let body = backend.request_body(&image, "rate it");

        let source = &body["messages"][0]["content"][1]["source"];
        assert_eq!(source["type"], "base64");
        assert_eq!(source["media_type"], "image/png");
        assert_eq!(source["data"], "cG5n");
        assert_eq!(body["max_tokens"], 50);
    }
}
