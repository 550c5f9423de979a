use mj_core::{Error, Result, TextGenerator};
use reqwest::Response;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::Config;

pub mod deepseek;
pub mod dummy;
pub mod gemini;

pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Per-provider settings derived from the shared inference [`Config`].
pub trait ModelConfig: Sized {
    fn from_inference_config(config: &Config) -> Self;
}

/// Split an endpoint override into its base URL and a trailing model id.
/// `https://host/v1beta/models/gemini-1.5-pro` -> (`https://host/v1beta`, `gemini-1.5-pro`).
pub(crate) fn split_model_url(raw: &str, default_base: &str, default_model: &str) -> (String, String) {
    let Ok(url) = Url::parse(raw) else {
        return (default_base.to_string(), default_model.to_string());
    };
    let path = url.path().trim_end_matches('/');
    let (base_path, model) = match path.rsplit_once("/models/") {
        Some((base, model)) if !model.is_empty() => (base.to_string(), model.to_string()),
        _ => (path.to_string(), default_model.to_string()),
    };
    let mut base = format!("{}://{}", url.scheme(), url.host_str().unwrap_or("localhost"));
    if let Some(port) = url.port() {
        base.push_str(&format!(":{}", port));
    }
    base.push_str(&base_path);
    (base, model)
}

/// Keys left at their template value count as missing.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty()
        || key.contains("YOUR_")
        || key.to_lowercase().contains("your-api-key")
        || key.to_lowercase().contains("replace")
}

pub(crate) fn require_key<'a>(provider: &str, api_key: Option<&'a str>) -> Result<&'a str> {
    match api_key {
        Some(key) if !is_placeholder_key(key) => Ok(key),
        _ => Err(Error::Inference(format!("{} API key is not configured", provider))),
    }
}

#[derive(Deserialize)]
struct UpstreamError {
    error: UpstreamErrorBody,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

/// Pass the upstream error message through when the call was rejected.
pub(crate) async fn check_response(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<UpstreamError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(Error::Inference(format!("{} returned {}: {}", provider, status, message)))
}

pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn TextGenerator>> {
    let config = config.unwrap_or_default();
    let model: Arc<dyn TextGenerator> = match config.model_name.as_deref().unwrap_or("gemini") {
        "gemini" => Arc::new(GeminiModel::new(Some(config.clone()))?),
        "deepseek" => Arc::new(DeepSeekModel::new(Some(config.clone()))?),
        "dummy" => Arc::new(DummyModel::new(Some(config.clone())).await?),
        other => {
            return Err(Error::Inference(format!(
                "Unknown model: {}. Available models: gemini (default), deepseek, dummy",
                other
            )))
        }
    };
    info!("🧠 Text generator ready (using {})", model.name());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_keys() {
        assert!(is_placeholder_key(""));
        assert!(is_placeholder_key("YOUR_GEMINI_KEY"));
        assert!(is_placeholder_key("Replace with your key"));
        assert!(!is_placeholder_key("AIzaSyExampleKey123"));
    }

    #[test]
    fn test_require_key() {
        assert!(require_key("Gemini", None).is_err());
        assert!(require_key("Gemini", Some("YOUR_KEY")).is_err());
        assert_eq!(require_key("Gemini", Some("abc")).unwrap(), "abc");
    }

    #[test]
    fn test_split_model_url() {
        let (base, model) = split_model_url(
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro",
            "unused",
            "gemini-1.5-flash",
        );
        assert_eq!(base, "https://generativelanguage.googleapis.com/v1beta");
        assert_eq!(model, "gemini-1.5-pro");

        let (base, model) = split_model_url("http://localhost:8080/v1", "unused", "deepseek-chat");
        assert_eq!(base, "http://localhost:8080/v1");
        assert_eq!(model, "deepseek-chat");

        let (base, model) = split_model_url("not a url", "https://default", "m");
        assert_eq!((base.as_str(), model.as_str()), ("https://default", "m"));
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let config = Config {
            model_name: Some("ollama".to_string()),
            ..Config::default()
        };
        let err = create_model(Some(config)).await.err().unwrap();
        assert!(err.to_string().contains("Unknown model"));
    }

    #[tokio::test]
    async fn test_default_model_is_gemini() {
        let model = create_model(None).await.unwrap();
        assert_eq!(model.name(), "Gemini");
    }
}
