use chrono::{DateTime, Duration, Utc};
use mj_core::{Collection, DocumentStore, Error, Result, Rubric, RubricType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::{decode_keyed, non_blank, require, require_id};

pub const ALL_LIMIT: usize = 50;
pub const BY_TYPE_LIMIT: usize = 20;
pub const RECENT_LIMIT: usize = 5;
pub const RUBRIC_PUBLISHED: &str = "Рубриката е публикувана успешно!";
pub const RUBRIC_DELETED: &str = "Рубриката е изтрита успешно!";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricDraft {
    /// Raw type id as submitted; parsed during validation.
    #[serde(rename = "type")]
    pub rubric_type: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricUpdate {
    #[serde(rename = "type")]
    pub rubric_type: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<String>,
}

impl RubricUpdate {
    fn into_patch(self) -> Result<Map<String, Value>> {
        let mut patch = Map::new();
        if let Some(raw) = self.rubric_type {
            let rubric_type: RubricType = raw.parse()?;
            patch.insert("type".to_string(), Value::String(rubric_type.id().to_string()));
        }
        for (field, value) in [("title", self.title), ("content", self.content), ("author", self.author)] {
            if let Some(value) = value {
                require(&[&value])?;
                patch.insert(field.to_string(), Value::String(value.trim().to_string()));
            }
        }
        for (field, value) in [("imageUrl", self.image_url), ("tags", self.tags)] {
            if let Some(value) = value {
                patch.insert(
                    field.to_string(),
                    non_blank(Some(value)).map(Value::String).unwrap_or(Value::Null),
                );
            }
        }
        if patch.is_empty() {
            return Err(Error::validation("Няма промени за запазване"));
        }
        Ok(patch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricPage {
    pub rubrics: Vec<Rubric>,
    /// Every rubric of the type, not only the returned page.
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricStatistics {
    pub total: usize,
    pub by_type: BTreeMap<RubricType, usize>,
    /// Published within the seven days before "now".
    pub last_week: usize,
}

impl RubricStatistics {
    pub fn count(&self, rubric_type: RubricType) -> usize {
        self.by_type.get(&rubric_type).copied().unwrap_or(0)
    }

    /// Rounded share of the total, 0 when there is nothing yet.
    pub fn percentage(&self, rubric_type: RubricType) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.count(rubric_type) as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[derive(Clone)]
pub struct RubricService {
    store: Arc<dyn DocumentStore>,
}

impl RubricService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: RubricDraft, now: DateTime<Utc>) -> Result<Rubric> {
        require(&[&draft.rubric_type, &draft.title, &draft.content, &draft.author])?;
        let rubric_type: RubricType = draft.rubric_type.parse()?;

        let mut rubric = Rubric {
            id: String::new(),
            rubric_type,
            title: draft.title.trim().to_string(),
            content: draft.content.trim().to_string(),
            author: draft.author.trim().to_string(),
            date: now.to_rfc3339(),
            image_url: non_blank(draft.image_url),
            tags: non_blank(draft.tags),
            published: true,
        };
        rubric.id = self
            .store
            .push(Collection::Rubrics, serde_json::to_value(&rubric)?)
            .await?;
        info!(rubric_id = %rubric.id, "{} Rubric published: {}", rubric_type.info().icon, rubric.title);
        Ok(rubric)
    }

    pub async fn update(&self, id: &str, update: RubricUpdate) -> Result<()> {
        require_id(id)?;
        let patch = update.into_patch()?;
        self.store.update(Collection::Rubrics, id, Value::Object(patch)).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        require_id(id)?;
        self.store.remove(Collection::Rubrics, id).await?;
        info!(rubric_id = %id, "🗑️ Rubric deleted");
        Ok(())
    }

    /// Every rubric, newest first.
    async fn newest_first(&self) -> Result<Vec<Rubric>> {
        let collection = Collection::Rubrics;
        let documents = self.store.fetch_all(collection, Some(collection.order_field())).await?;
        let mut rubrics: Vec<Rubric> = decode_keyed(documents, |rubric: &mut Rubric, key| rubric.id = key);
        rubrics.sort_by_key(|rubric| Reverse(rubric.sort_key()));
        Ok(rubrics)
    }

    pub async fn all(&self, limit: usize) -> Result<Vec<Rubric>> {
        let mut rubrics = self.newest_first().await?;
        rubrics.truncate(limit);
        Ok(rubrics)
    }

    pub async fn by_type(&self, rubric_type: RubricType, limit: usize) -> Result<RubricPage> {
        let matching: Vec<Rubric> = self
            .newest_first()
            .await?
            .into_iter()
            .filter(|rubric| rubric.rubric_type == rubric_type)
            .collect();
        let total = matching.len();
        Ok(RubricPage {
            rubrics: matching.into_iter().take(limit).collect(),
            total,
        })
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<Rubric>> {
        self.all(limit).await
    }

    pub async fn statistics(&self, now: DateTime<Utc>) -> Result<RubricStatistics> {
        let rubrics = self.newest_first().await?;
        let week_ago = now - Duration::days(7);
        let mut stats = RubricStatistics {
            total: rubrics.len(),
            ..RubricStatistics::default()
        };
        for rubric_type in RubricType::ALL {
            stats.by_type.insert(rubric_type, 0);
        }
        for rubric in &rubrics {
            *stats.by_type.entry(rubric.rubric_type).or_default() += 1;
            if rubric.published_at().is_some_and(|at| at >= week_ago) {
                stats.last_week += 1;
            }
        }
        Ok(stats)
    }
}
