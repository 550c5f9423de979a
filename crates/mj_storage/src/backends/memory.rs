use async_trait::async_trait;
use mj_core::{Collection, Document, DocumentStore, Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::ordering::compare_children;
use crate::{BackendConfig, StorageBackend};

/// Collections kept in insertion order, the way a freshly exported
/// realtime database snapshot reads back.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<Collection, Vec<(String, Value)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self, collection: Collection) -> &[(String, Value)] {
        self.collections.get(&collection).map(Vec::as_slice).unwrap_or(&[])
    }

    fn records_mut(&mut self, collection: Collection) -> &mut Vec<(String, Value)> {
        self.collections.entry(collection).or_default()
    }

    pub fn fetch_all(&self, collection: Collection, order_by: Option<&str>) -> Vec<Document> {
        let mut records: Vec<&(String, Value)> = self.records(collection).iter().collect();
        if let Some(field) = order_by {
            records.sort_by(|(ka, a), (kb, b)| compare_children(field, (ka.as_str(), a), (kb.as_str(), b)));
        }
        records
            .into_iter()
            .map(|(key, value)| Document::new(key.clone(), value.clone()))
            .collect()
    }

    pub fn fetch_one(&self, collection: Collection, key: &str) -> Option<Value> {
        self.records(collection)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&mut self, collection: Collection, key: String, value: Value) {
        let records = self.records_mut(collection);
        match records.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => records.push((key, value)),
        }
    }

    pub fn push(&mut self, collection: Collection, value: Value) -> String {
        let key = format!("-{}", Uuid::new_v4().simple());
        self.records_mut(collection).push((key.clone(), value));
        key
    }

    /// Merge top-level fields; a missing record is created, as the hosted
    /// database does for `PATCH` on an empty path.
    pub fn update(&mut self, collection: Collection, key: &str, partial: Value) -> Result<()> {
        let Value::Object(fields) = partial else {
            return Err(Error::Storage("update expects an object of fields".to_string()));
        };
        let records = self.records_mut(collection);
        match records.iter_mut().find(|(k, _)| k == key) {
            Some((_, Value::Object(existing))) => {
                for (field, value) in fields {
                    if value.is_null() {
                        existing.remove(&field);
                    } else {
                        existing.insert(field, value);
                    }
                }
            }
            Some((_, existing)) => *existing = Value::Object(fields),
            None => records.push((key.to_string(), Value::Object(fields))),
        }
        Ok(())
    }

    pub fn remove(&mut self, collection: Collection, key: &str) {
        self.records_mut(collection).retain(|(k, _)| k != key);
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database export shaped `{ "articles": { key: record, .. }, .. }`.
    /// Unknown top-level collections are ignored.
    pub fn from_export(export: Value) -> Result<Self> {
        let Value::Object(root) = export else {
            return Err(Error::Storage("export must be a JSON object".to_string()));
        };
        let mut store = MemoryStore::new();
        for collection in Collection::ALL {
            match root.get(collection.name()) {
                Some(Value::Object(records)) => {
                    for (key, value) in records {
                        store.insert(collection, key.clone(), value.clone());
                    }
                }
                Some(Value::Null) | None => {}
                Some(_) => {
                    return Err(Error::Storage(format!(
                        "collection {} must be an object of records",
                        collection
                    )))
                }
            }
        }
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
        })
    }

    pub async fn insert(&self, collection: Collection, key: impl Into<String>, value: Value) {
        self.store.write().await.insert(collection, key.into(), value);
    }
}

#[async_trait]
impl StorageBackend for InMemoryStore {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn from_config(_config: BackendConfig) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn fetch_all(&self, collection: Collection, order_by: Option<&str>) -> Result<Vec<Document>> {
        let store = self.store.read().await;
        Ok(store.fetch_all(collection, order_by))
    }

    async fn fetch_one(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        let store = self.store.read().await;
        Ok(store.fetch_one(collection, key))
    }

    async fn push(&self, collection: Collection, value: Value) -> Result<String> {
        let mut store = self.store.write().await;
        let key = store.push(collection, value);
        debug!(collection = %collection, key = %key, "pushed record");
        Ok(key)
    }

    async fn update(&self, collection: Collection, key: &str, partial: Value) -> Result<()> {
        let mut store = self.store.write().await;
        store.update(collection, key, partial)
    }

    async fn remove(&self, collection: Collection, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.remove(collection, key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
