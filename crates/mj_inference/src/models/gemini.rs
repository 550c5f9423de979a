use async_trait::async_trait;
use mj_core::{Error, Result, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{check_response, require_key, split_model_url, ModelConfig};
use crate::Config;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone)]
pub struct GeminiModelConfig {
    base_url: String,
    model_name: String,
}

impl ModelConfig for GeminiModelConfig {
    fn from_inference_config(config: &Config) -> Self {
        let (base_url, model_name) = match &config.model_url {
            Some(url) => split_model_url(url, DEFAULT_BASE_URL, DEFAULT_MODEL),
            None => (DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string()),
        };
        Self { base_url, model_name }
    }
}

impl GeminiModelConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }
}

pub struct GeminiModel {
    client: Arc<Client>,
    api_key: Option<String>,
    config: GeminiModelConfig,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("endpoint", &self.config.endpoint())
            .finish()
    }
}

impl GeminiModel {
    /// The key is checked per call so a missing one degrades a single
    /// generation instead of the whole startup.
    pub fn new(config: Option<Config>) -> Result<Self> {
        let config = config.unwrap_or_default();
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key: config.api_key.clone(),
            config: GeminiModelConfig::from_inference_config(&config),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = require_key("Gemini", self.api_key.as_deref())?;
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %self.config.model_name, prompt_chars = prompt.chars().count(), "calling Gemini");
        let response = self
            .client
            .post(self.config.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;
        let response = check_response("Gemini", response).await?;
        let body = response.json::<GenerateResponse>().await?;

        body.candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| Error::Inference("Gemini returned no candidates".to_string()))
    }
}
