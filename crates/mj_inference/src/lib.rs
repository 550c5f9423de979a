use mj_core::SiteConfig;

pub mod models;

pub use mj_core::TextGenerator;
pub use models::create_model;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    /// Provider: `gemini` (default), `deepseek` or `dummy`.
    pub model_name: Option<String>,
    /// Endpoint override; its path may end with the model id,
    /// e.g. `https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash`.
    pub model_url: Option<String>,
}

impl From<&SiteConfig> for Config {
    fn from(site: &SiteConfig) -> Self {
        Self {
            api_key: site.api_key.clone(),
            model_name: Some(site.model.clone()),
            model_url: site.model_url.clone(),
        }
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::Config;
    pub use mj_core::{Error, Result, TextGenerator};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_from_site() {
        let site = SiteConfig {
            model: "dummy".to_string(),
            api_key: Some("k".to_string()),
            ..SiteConfig::default()
        };
        let config = Config::from(&site);
        assert_eq!(config.model_name.as_deref(), Some("dummy"));

        let model = create_model(Some(config)).await.unwrap();
        assert_eq!(model.name(), "Dummy");
    }
}
