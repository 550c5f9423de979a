use async_trait::async_trait;
use mj_core::{Error, Result, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{check_response, require_key, split_model_url, ModelConfig};
use crate::Config;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Clone)]
pub struct DeepSeekModelConfig {
    base_url: String,
    model_name: String,
}

impl ModelConfig for DeepSeekModelConfig {
    fn from_inference_config(config: &Config) -> Self {
        let (base_url, model_name) = match &config.model_url {
            Some(url) => split_model_url(url, DEFAULT_BASE_URL, DEFAULT_MODEL),
            None => (DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string()),
        };
        Self { base_url, model_name }
    }
}

/// Any OpenAI-compatible chat completions endpoint.
pub struct DeepSeekModel {
    client: Arc<Client>,
    api_key: Option<String>,
    config: DeepSeekModelConfig,
}

impl DeepSeekModel {
    pub fn new(config: Option<Config>) -> Result<Self> {
        let config = config.unwrap_or_default();
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key: config.api_key.clone(),
            config: DeepSeekModelConfig::from_inference_config(&config),
        })
    }
}

impl fmt::Debug for DeepSeekModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for DeepSeekModel {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = require_key("DeepSeek", self.api_key.as_deref())?;
        let request = ChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!(model = %self.config.model_name, "calling chat completions");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;
        let response = check_response("DeepSeek", response).await?;
        let body = response.json::<ChatResponse>().await?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference("DeepSeek returned no choices".to_string()))
    }
}
