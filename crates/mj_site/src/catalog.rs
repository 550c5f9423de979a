use mj_core::{is_valid_key, Article, ArticleRecord, Collection, DocumentStore, Error, Result};
use std::cmp::Reverse;
use tracing::{debug, info, warn};

pub const DEFAULT_INITIAL_COUNT: usize = 6;

pub const ARTICLE_NOT_FOUND: &str = "Статията не е намерена";

/// The in-memory article list and its two views.
///
/// `all` keeps the store's fetch order (ascending by `date`); `initial`
/// holds the newest few, sorted by parsed date descending.
#[derive(Debug, Clone)]
pub struct ArticleCatalog {
    all: Vec<Article>,
    initial: Vec<Article>,
    initial_count: usize,
}

impl Default for ArticleCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_COUNT)
    }
}

impl ArticleCatalog {
    pub fn new(initial_count: usize) -> Self {
        Self {
            all: Vec::new(),
            initial: Vec::new(),
            initial_count,
        }
    }

    pub fn from_articles(articles: Vec<Article>, initial_count: usize) -> Self {
        let mut catalog = Self::new(initial_count);
        catalog.replace(articles);
        catalog
    }

    fn replace(&mut self, articles: Vec<Article>) {
        let mut newest = articles.clone();
        newest.sort_by_key(|article| Reverse(article.sort_key()));
        newest.truncate(self.initial_count);
        self.initial = newest;
        self.all = articles;
    }

    /// Refresh both views from the store.
    ///
    /// On failure the previous views are kept and the error is handed
    /// back so the caller can show it.
    pub async fn load_all(&mut self, store: &dyn DocumentStore) -> Result<usize> {
        match fetch_articles(store).await {
            Ok(articles) => {
                let count = articles.len();
                self.replace(articles);
                info!("📰 Loaded {} articles", count);
                Ok(count)
            }
            Err(e) => {
                warn!(store = store.name(), error = %e, "failed to load articles, keeping previous list");
                Err(e)
            }
        }
    }

    pub fn all(&self) -> &[Article] {
        &self.all
    }

    pub fn initial(&self) -> &[Article] {
        &self.initial
    }

    pub fn find(&self, id: &str) -> Option<&Article> {
        self.all.iter().find(|article| article.id == id)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Read the whole `articles` collection in store order.
/// Records that are not objects are skipped.
pub async fn fetch_articles(store: &dyn DocumentStore) -> Result<Vec<Article>> {
    let collection = Collection::Articles;
    let documents = store.fetch_all(collection, Some(collection.order_field())).await?;
    let mut articles = Vec::with_capacity(documents.len());
    for document in documents {
        match document.decode::<ArticleRecord>() {
            Ok(record) => articles.push(Article::from_record(document.key, record)),
            Err(e) => warn!(article_id = %document.key, error = %e, "skipping malformed article"),
        }
    }
    Ok(articles)
}

/// Fetch a single article for the article page.
pub async fn load_one(store: &dyn DocumentStore, id: &str) -> Result<Article> {
    debug!(article_id = %id, "loading article");
    if !is_valid_key(id) {
        return Err(Error::NotFound(ARTICLE_NOT_FOUND.to_string()));
    }
    let value = store
        .fetch_one(Collection::Articles, id)
        .await?
        .ok_or_else(|| Error::NotFound(ARTICLE_NOT_FOUND.to_string()))?;
    let record: ArticleRecord = serde_json::from_value(value)?;
    Ok(Article::from_record(id, record))
}
