use super::GenerationService;
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
/// Failures are reported once; nothing is retried.
pub struct HttpGenerator {
    client: Client,
    base_url: Url,
    model_id: String,
    api_key: Option<String>,
    temperature: Option<f32>,
}

impl HttpGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Self::with_timeout(config, config.timeout())
    }

    pub fn with_timeout(config: &GenerationConfig, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid generation base URL: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            model_id: config.model.clone(),
            api_key: config.api_key(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid generation base URL: {}", e)))
    }
}

fn service_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::GenerationService(format!("request timed out: {}", e))
    } else {
        Error::GenerationService(e.to_string())
    }
}

#[async_trait]
impl GenerationService for HttpGenerator {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = self.endpoint("/v1/chat/completions")?;
        let request = ChatRequest {
            model: &self.model_id,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        debug!("POST {} (model {})", url, self.model_id);
        let mut builder = self.client.post(url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(service_error)?
            .error_for_status()
            .map_err(service_error)?;

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(service_error)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                Error::GenerationService("response contained no completion".to_string())
            })
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}
