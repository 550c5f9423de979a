use async_trait::async_trait;
use mj_core::{Collection, Document, DocumentStore, Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};
use url::Url;

use crate::ordering::compare_children;
use crate::{BackendConfig, StorageBackend};

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

/// REST client for a hosted realtime database (`{base}/{collection}.json`).
pub struct RealtimeStore {
    client: Client,
    base_url: Url,
    auth: Option<String>,
}

impl fmt::Debug for RealtimeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeStore")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RealtimeStore {
    pub fn new(base_url: &str, auth: Option<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            auth,
        })
    }

    /// `{base}/{collection}.json` or `{base}/{collection}/{key}.json`. The key
    /// is pushed as one percent-encoded segment, so it can never step out of
    /// its collection or address a child field.
    pub fn resource_url(&self, collection: Collection, key: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?;
            segments.pop_if_empty();
            match key {
                Some(key) => segments.push(collection.name()).push(&format!("{}.json", key)),
                None => segments.push(&format!("{}.json", collection.name())),
            };
        }
        if let Some(auth) = &self.auth {
            url.query_pairs_mut().append_pair("auth", auth);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

/// Turn a collection snapshot (`null` or `{ key: record }`) into documents,
/// sorted by `order_by` since the REST API does not keep child order.
pub fn documents_from_snapshot(snapshot: Value, order_by: Option<&str>) -> Result<Vec<Document>> {
    let records = match snapshot {
        Value::Null => return Ok(Vec::new()),
        Value::Object(records) => records,
        other => {
            return Err(Error::Storage(format!(
                "expected an object of records, got {}",
                other
            )))
        }
    };
    let mut documents: Vec<Document> = records
        .into_iter()
        .map(|(key, value)| Document::new(key, value))
        .collect();
    if let Some(field) = order_by {
        documents.sort_by(|a, b| compare_children(field, (a.key.as_str(), &a.value), (b.key.as_str(), &b.value)));
    }
    Ok(documents)
}

#[async_trait]
impl StorageBackend for RealtimeStore {
    fn get_error_message() -> &'static str {
        "Realtime database should be reachable at the configured URL"
    }

    async fn from_config(config: BackendConfig) -> Result<Self> {
        let url = config
            .url
            .ok_or_else(|| Error::InvalidUrl("the realtime store needs a database URL".to_string()))?;
        let store = Self::new(&url, config.auth)?;
        info!("🔥 Realtime database at {}", store.base_url);
        Ok(store)
    }
}

#[async_trait]
impl DocumentStore for RealtimeStore {
    async fn fetch_all(&self, collection: Collection, order_by: Option<&str>) -> Result<Vec<Document>> {
        let mut url = self.resource_url(collection, None)?;
        if let Some(field) = order_by {
            url.query_pairs_mut().append_pair("orderBy", &format!("\"{}\"", field));
        }
        debug!(collection = %collection, "fetching collection");
        let snapshot = self.send(self.client.get(url)).await?;
        documents_from_snapshot(snapshot, order_by)
    }

    async fn fetch_one(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        let url = self.resource_url(collection, Some(key))?;
        match self.send(self.client.get(url)).await? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn push(&self, collection: Collection, value: Value) -> Result<String> {
        let url = self.resource_url(collection, None)?;
        let response = self.send(self.client.post(url).json(&value)).await?;
        let PushResponse { name } = serde_json::from_value(response)?;
        debug!(collection = %collection, key = %name, "pushed record");
        Ok(name)
    }

    async fn update(&self, collection: Collection, key: &str, partial: Value) -> Result<()> {
        if !partial.is_object() {
            return Err(Error::Storage("update expects an object of fields".to_string()));
        }
        let url = self.resource_url(collection, Some(key))?;
        self.send(self.client.patch(url).json(&partial)).await?;
        Ok(())
    }

    async fn remove(&self, collection: Collection, key: &str) -> Result<()> {
        let url = self.resource_url(collection, Some(key))?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "realtime"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_urls() {
        let store = RealtimeStore::new("https://club-default-rtdb.firebaseio.com", None).unwrap();
        assert_eq!(
            store.resource_url(Collection::Articles, None).unwrap().as_str(),
            "https://club-default-rtdb.firebaseio.com/articles.json"
        );
        assert_eq!(
            store.resource_url(Collection::Events, Some("-Nx1")).unwrap().as_str(),
            "https://club-default-rtdb.firebaseio.com/events/-Nx1.json"
        );
    }

    #[test]
    fn test_auth_is_appended_and_redacted() {
        let store = RealtimeStore::new("https://db.example.com/root", Some("secret".to_string())).unwrap();
        let url = store.resource_url(Collection::Rubrics, None).unwrap();
        assert_eq!(url.as_str(), "https://db.example.com/root/rubrics.json?auth=secret");
        assert!(!format!("{:?}", store).contains("secret"));
    }

    #[test]
    fn test_keys_stay_inside_their_collection() {
        let store = RealtimeStore::new("https://club-default-rtdb.firebaseio.com", None).unwrap();
        assert_eq!(
            store.resource_url(Collection::Articles, Some("../applications")).unwrap().as_str(),
            "https://club-default-rtdb.firebaseio.com/articles/..%2Fapplications.json"
        );
        assert_eq!(
            store.resource_url(Collection::Articles, Some("-a/imageUrl")).unwrap().as_str(),
            "https://club-default-rtdb.firebaseio.com/articles/-a%2FimageUrl.json"
        );
        let url = store.resource_url(Collection::Events, Some("..")).unwrap();
        assert!(url.path().starts_with("/events/"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(RealtimeStore::new("::nope", None), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_snapshot_parsing() {
        assert!(documents_from_snapshot(Value::Null, Some("date")).unwrap().is_empty());

        let documents = documents_from_snapshot(
            json!({
                "-b": { "date": "2024-03-01" },
                "-a": { "date": "2024-01-01" },
                "-c": { "date": "2024-02-01" }
            }),
            Some("date"),
        )
        .unwrap();
        let keys: Vec<_> = documents.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["-a", "-c", "-b"]);

        assert!(documents_from_snapshot(json!("oops"), None).is_err());
    }
}
