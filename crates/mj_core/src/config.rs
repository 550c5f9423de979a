use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::{Error, Result};

/// Settings resolved once at startup and handed to every component.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `memory` or `realtime`.
    pub storage: String,
    pub store_url: Option<String>,
    pub store_auth: Option<String>,
    /// `gemini`, `deepseek` or `dummy`.
    pub model: String,
    pub model_url: Option<String>,
    pub api_key: Option<String>,
    /// Whether the newspaper builder may delegate to the generative model.
    pub ai_composition_enabled: bool,
    pub search_debounce: Duration,
    pub initial_count: usize,
    pub suggestion_limit: usize,
    pub rubric_page_size: usize,
    /// Public address used in share payloads.
    pub site_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            storage: "memory".to_string(),
            store_url: None,
            store_auth: None,
            model: "gemini".to_string(),
            model_url: None,
            api_key: None,
            ai_composition_enabled: false,
            search_debounce: Duration::from_millis(300),
            initial_count: 6,
            suggestion_limit: 5,
            rubric_page_size: 6,
            site_url: "http://localhost:3000".to_string(),
        }
    }
}

impl SiteConfig {
    /// Read `MJ_*` variables over the defaults. `GEMINI_API_KEY` is accepted
    /// when `MJ_API_KEY` is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();
        if let Some(storage) = get("MJ_STORAGE") {
            config.storage = storage;
        }
        config.store_url = get("MJ_STORE_URL");
        config.store_auth = get("MJ_STORE_AUTH");
        if let Some(model) = get("MJ_MODEL") {
            config.model = model;
        }
        config.model_url = get("MJ_MODEL_URL");
        config.api_key = get("MJ_API_KEY").or_else(|| get("GEMINI_API_KEY"));
        if let Some(raw) = get("MJ_AI_COMPOSITION") {
            config.ai_composition_enabled = parse_flag("MJ_AI_COMPOSITION", &raw)?;
        }
        if let Some(raw) = get("MJ_SEARCH_DEBOUNCE_MS") {
            config.search_debounce = Duration::from_millis(parse_number("MJ_SEARCH_DEBOUNCE_MS", &raw)?);
        }
        if let Some(raw) = get("MJ_INITIAL_COUNT") {
            config.initial_count = parse_number("MJ_INITIAL_COUNT", &raw)?;
        }
        if let Some(raw) = get("MJ_SUGGESTION_LIMIT") {
            config.suggestion_limit = parse_number("MJ_SUGGESTION_LIMIT", &raw)?;
        }
        if let Some(raw) = get("MJ_RUBRIC_PAGE_SIZE") {
            config.rubric_page_size = parse_number("MJ_RUBRIC_PAGE_SIZE", &raw)?;
        }
        if let Some(site_url) = get("MJ_SITE_URL") {
            config.site_url = site_url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.storage.as_str() {
            "memory" => {}
            "realtime" => {
                let url = self.store_url.as_deref().ok_or_else(|| {
                    Error::InvalidUrl("the realtime store needs a database URL".to_string())
                })?;
                parse_url(url)?;
            }
            other => return Err(Error::Storage(format!("Unknown storage backend: {}", other))),
        }
        if let Some(url) = &self.model_url {
            parse_url(url)?;
        }
        parse_url(&self.site_url)?;
        Ok(())
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::validation(format!("{} must be true or false, got {}", name, raw))),
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::validation(format!("{} must be a number, got {}", name, raw)))
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.initial_count, 6);
        assert_eq!(config.suggestion_limit, 5);
        assert!(!config.ai_composition_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_realtime_requires_url() {
        let mut config = SiteConfig {
            storage: "realtime".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        config.store_url = Some("https://club-default-rtdb.firebaseio.com".to_string());
        assert!(config.validate().is_ok());

        config.store_url = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("MJ_MODEL", "dummy"),
            ("GEMINI_API_KEY", "abc"),
            ("MJ_AI_COMPOSITION", "true"),
            ("MJ_SEARCH_DEBOUNCE_MS", "150"),
            ("MJ_STORE_URL", "  "),
        ]
        .into_iter()
        .collect();
        let config = SiteConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.model, "dummy");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert!(config.ai_composition_enabled);
        assert_eq!(config.search_debounce, Duration::from_millis(150));
        assert_eq!(config.store_url, None);
        assert_eq!(config.initial_count, 6);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let bad_flag = SiteConfig::from_lookup(|name| (name == "MJ_AI_COMPOSITION").then(|| "maybe".to_string()));
        assert!(matches!(bad_flag, Err(Error::Validation(_))));

        let bad_count = SiteConfig::from_lookup(|name| (name == "MJ_INITIAL_COUNT").then(|| "six".to_string()));
        assert!(bad_count.is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let config = SiteConfig {
            storage: "qdrant".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Storage(_))));
    }
}
