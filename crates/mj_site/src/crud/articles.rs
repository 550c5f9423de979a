use chrono::{DateTime, Utc};
use mj_core::types::MAX_IMAGES;
use mj_core::{Article, ArticleRecord, Category, Collection, DocumentStore, Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use super::{non_blank, require, require_id};
use crate::catalog::ArticleCatalog;

pub const ARTICLE_PUBLISHED: &str = "Статията е публикувана успешно!";
pub const ARTICLE_UPDATED: &str = "Статията е обновена успешно!";
pub const ARTICLE_DELETED: &str = "Статията е изтрита успешно!";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    pub title: String,
    pub author: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Defaults to the creation time.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update; `None` leaves a field as stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    /// Replaces every image slot.
    pub images: Option<Vec<String>>,
}

impl ArticleUpdate {
    fn into_patch(self) -> Result<Map<String, Value>> {
        let mut patch = Map::new();
        for (field, value) in [
            ("title", self.title),
            ("author", self.author),
            ("content", self.content),
            ("category", self.category),
        ] {
            if let Some(value) = value {
                require(&[&value])?;
                patch.insert(field.to_string(), Value::String(value.trim().to_string()));
            }
        }
        if let Some(excerpt) = self.excerpt {
            // a blank excerpt clears it so the derived one is used again
            patch.insert(
                "excerpt".to_string(),
                non_blank(Some(excerpt)).map(Value::String).unwrap_or(Value::Null),
            );
        }
        if let Some(date) = self.date {
            require(&[&date])?;
            patch.insert("date".to_string(), Value::String(date));
        }
        if let Some(images) = self.images {
            let mut images = images.into_iter().filter_map(|url| non_blank(Some(url)));
            for slot in 0..MAX_IMAGES {
                let field = if slot == 0 {
                    "imageUrl".to_string()
                } else {
                    format!("imageUrl{}", slot + 1)
                };
                patch.insert(field, images.next().map(Value::String).unwrap_or(Value::Null));
            }
        }
        if patch.is_empty() {
            return Err(Error::validation("Няма промени за запазване"));
        }
        Ok(patch)
    }
}

/// Article commands; each one refreshes the catalog afterwards.
#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn DocumentStore>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        catalog: &mut ArticleCatalog,
        draft: ArticleDraft,
        now: DateTime<Utc>,
    ) -> Result<String> {
        require(&[&draft.title, &draft.author, &draft.content, &draft.category])?;
        let article = Article {
            id: String::new(),
            title: draft.title.trim().to_string(),
            author: draft.author.trim().to_string(),
            category: Category::from(draft.category.trim().to_string()),
            rubric: None,
            content: draft.content,
            excerpt: non_blank(draft.excerpt),
            date: non_blank(draft.date).unwrap_or_else(|| now.to_rfc3339()),
            images: draft.images,
        };
        let record: ArticleRecord = article.to_record();

        let id = self
            .store
            .push(Collection::Articles, serde_json::to_value(record)?)
            .await?;
        info!(article_id = %id, "📝 Article published: {}", article.title);
        catalog.load_all(self.store.as_ref()).await?;
        Ok(id)
    }

    pub async fn update(&self, catalog: &mut ArticleCatalog, id: &str, update: ArticleUpdate) -> Result<()> {
        require_id(id)?;
        let patch = update.into_patch()?;
        self.store
            .update(Collection::Articles, id, Value::Object(patch))
            .await?;
        info!(article_id = %id, "✏️ Article updated");
        catalog.load_all(self.store.as_ref()).await?;
        Ok(())
    }

    pub async fn delete(&self, catalog: &mut ArticleCatalog, id: &str) -> Result<()> {
        require_id(id)?;
        self.store.remove(Collection::Articles, id).await?;
        info!(article_id = %id, "🗑️ Article deleted");
        catalog.load_all(self.store.as_ref()).await?;
        Ok(())
    }
}
