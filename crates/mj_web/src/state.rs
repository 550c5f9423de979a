use mj_core::{DocumentStore, SiteConfig, TextGenerator};
use mj_site::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared by every handler. The site state has a single writer at a time;
/// services talk to the store directly.
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: SiteConfig,
    pub site: RwLock<SiteState>,
    pub articles: ArticleService,
    pub rubrics: RubricService,
    pub events: EventService,
    pub applications: ApplicationService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, generator: Option<Arc<dyn TextGenerator>>, config: SiteConfig) -> Self {
        let composer = Composer::new(generator, config.ai_composition_enabled);
        Self {
            site: RwLock::new(SiteState::new(&config, composer)),
            articles: ArticleService::new(store.clone()),
            rubrics: RubricService::new(store.clone()),
            events: EventService::new(store.clone()),
            applications: ApplicationService::new(store.clone()),
            store,
            config,
        }
    }

    /// Fill the catalog before serving. A failure is kept as an error panel
    /// and the server still starts.
    pub async fn load(&self) -> mj_core::Result<usize> {
        let mut site = self.site.write().await;
        site.load(self.store.as_ref()).await
    }
}
