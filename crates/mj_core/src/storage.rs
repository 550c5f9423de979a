use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Articles,
    Rubrics,
    Events,
    Applications,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Articles,
        Collection::Rubrics,
        Collection::Events,
        Collection::Applications,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Articles => "articles",
            Collection::Rubrics => "rubrics",
            Collection::Events => "events",
            Collection::Applications => "applications",
        }
    }

    /// The child field each collection is read back ordered by.
    pub fn order_field(&self) -> &'static str {
        match self {
            Collection::Articles | Collection::Rubrics => "date",
            Collection::Events | Collection::Applications => "timestamp",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Characters the hosted database refuses in a record key.
pub const FORBIDDEN_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Whether `key` can name a single record of a collection.
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains(&FORBIDDEN_KEY_CHARS[..]) && !key.chars().any(char::is_control)
}

/// One record of a collection together with its store-assigned key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub value: Value,
}

impl Document {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// A hosted document store organised as flat key -> record collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every record of a collection, ascending by `order_by` when given.
    /// A collection that does not exist yields an empty list.
    async fn fetch_all(&self, collection: Collection, order_by: Option<&str>) -> Result<Vec<Document>>;

    async fn fetch_one(&self, collection: Collection, key: &str) -> Result<Option<Value>>;

    /// Append a record and return the key the store generated for it.
    async fn push(&self, collection: Collection, value: Value) -> Result<String>;

    /// Merge the top-level fields of `partial` into an existing record.
    async fn update(&self, collection: Collection, key: &str, partial: Value) -> Result<()>;

    async fn remove(&self, collection: Collection, key: &str) -> Result<()>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_order_fields() {
        assert_eq!(Collection::Articles.order_field(), "date");
        assert_eq!(Collection::Rubrics.order_field(), "date");
        assert_eq!(Collection::Events.order_field(), "timestamp");
        assert_eq!(Collection::Applications.to_string(), "applications");
    }

    #[test]
    fn test_record_keys() {
        assert!(is_valid_key("-NxA1b2C3"));
        assert!(!is_valid_key("  "));
        assert!(!is_valid_key("../applications"));
        assert!(!is_valid_key("-a/imageUrl"));
        assert!(!is_valid_key("a#b"));
        assert!(!is_valid_key("$key"));
        assert!(!is_valid_key("a[0]"));
    }

    #[test]
    fn test_document_decode() {
        #[derive(serde::Deserialize)]
        struct Named {
            name: String,
        }

        let doc = Document::new("-abc", json!({ "name": "Мария" }));
        let named: Named = doc.decode().unwrap();
        assert_eq!(named.name, "Мария");

        let bad = Document::new("-def", json!({ "other": 1 }));
        assert!(bad.decode::<Named>().is_err());
    }
}
