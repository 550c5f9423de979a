use mj_core::{DocumentStore, Error, Result, SiteConfig};
use tracing::warn;

use crate::catalog::ArticleCatalog;
use crate::newspaper::{Composer, NewspaperBuilder};
use crate::render::{ArticleListView, ErrorPanel, ErrorPanels};
use crate::rubric_browser::RubricBrowser;
use crate::search::{search, suggestions, SearchOutcome, Suggestion};
use crate::selection::{SelectionControls, SelectionSet};

pub const LOAD_ARTICLES_FAILED: &str = "Грешка при зареждане на статиите";

/// Everything one visitor's page works on, passed explicitly to each
/// component.
#[derive(Debug, Clone)]
pub struct SiteState {
    pub catalog: ArticleCatalog,
    pub selection: SelectionSet,
    pub list_view: ArticleListView,
    pub newspaper: NewspaperBuilder,
    pub browser: RubricBrowser,
    pub panels: ErrorPanels,
    outcome: SearchOutcome,
    show_images: bool,
    suggestion_limit: usize,
}

impl SiteState {
    pub fn new(config: &SiteConfig, composer: Composer) -> Self {
        let catalog = ArticleCatalog::new(config.initial_count);
        let outcome = search(&catalog, "", true);
        let mut state = Self {
            catalog,
            selection: SelectionSet::new(),
            list_view: ArticleListView::new(),
            newspaper: NewspaperBuilder::new(composer),
            browser: RubricBrowser::new(config.rubric_page_size),
            panels: ErrorPanels::default(),
            outcome,
            show_images: true,
            suggestion_limit: config.suggestion_limit,
        };
        state.render();
        state
    }

    fn render(&mut self) {
        self.list_view.render(&self.outcome, &self.selection);
    }

    /// Reload the catalog and re-run the current query. A failure raises an
    /// error panel and keeps what was on screen.
    pub async fn load(&mut self, store: &dyn DocumentStore) -> Result<usize> {
        match self.catalog.load_all(store).await {
            Ok(count) => {
                self.refresh();
                Ok(count)
            }
            Err(e) => {
                self.report(LOAD_ARTICLES_FAILED, &e);
                Err(e)
            }
        }
    }

    pub fn apply_query(&mut self, raw_query: &str) -> &SearchOutcome {
        self.outcome = search(&self.catalog, raw_query, self.show_images);
        self.render();
        &self.outcome
    }

    /// Re-run the active query against the current catalog.
    pub fn refresh(&mut self) -> &SearchOutcome {
        let query = self.outcome.query.clone();
        self.apply_query(&query)
    }

    pub fn outcome(&self) -> &SearchOutcome {
        &self.outcome
    }

    pub fn set_show_images(&mut self, show_images: bool) {
        self.show_images = show_images;
        self.refresh();
    }

    pub fn suggestions(&self, raw_query: &str) -> Vec<Suggestion> {
        suggestions(&self.catalog, raw_query, self.suggestion_limit)
    }

    pub fn toggle(&mut self, article_id: &str, checked: bool) -> Option<SelectionControls> {
        self.list_view.toggle(&mut self.selection, article_id, checked)
    }

    pub fn clear_selection(&mut self) -> SelectionControls {
        self.selection.clear();
        self.render();
        self.list_view.controls()
    }

    pub fn report(&mut self, title: &str, error: &Error) -> ErrorPanel {
        warn!(error = %error, "{}", title);
        self.panels.push(title, error).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{three_article_store, FailingStore};
    use crate::newspaper::{Composition, Phase};
    use crate::render::articles::NO_ARTICLES;
    use crate::search::{RenderMode, Scope};
    use chrono::Utc;
    use mj_storage::InMemoryStore;

    fn state() -> SiteState {
        SiteState::new(&SiteConfig::default(), Composer::default())
    }

    #[tokio::test]
    async fn test_end_to_end_basic_issue() {
        let mut site = state();
        site.load(&three_article_store()).await.unwrap();

        let outcome = site.outcome();
        assert_eq!(outcome.mode, RenderMode::Full);
        let ids: Vec<_> = outcome.articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["-mar", "-feb", "-jan"]);

        site.toggle("-mar", true).unwrap();
        let controls = site.toggle("-feb", true).unwrap();
        assert_eq!(controls.count, 2);
        assert!(controls.build_enabled);

        let newspaper = site
            .newspaper
            .build(&site.catalog, &site.selection, Composition::Basic, Utc::now())
            .await
            .unwrap();
        assert_eq!(newspaper.stats.article_count, 2);
        assert_eq!(newspaper.lead_id(), Some("-mar"));
        assert_eq!(site.newspaper.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let mut site = state();
        assert_eq!(site.load(&InMemoryStore::new()).await.unwrap(), 0);
        assert!(site.catalog.initial().is_empty());
        assert!(site.list_view.markup().contains(NO_ARTICLES));
        assert_eq!(site.list_view.caption(), "Няма намерени статии, отговарящи на търсенето.");
    }

    #[tokio::test]
    async fn test_load_failure_raises_panel_and_keeps_list() {
        let mut site = state();
        site.load(&three_article_store()).await.unwrap();
        site.apply_query("брой");

        assert!(site.load(&FailingStore).await.is_err());
        assert_eq!(site.panels.panels().len(), 1);
        assert_eq!(site.panels.panels()[0].title, LOAD_ARTICLES_FAILED);
        assert_eq!(site.outcome().articles.len(), 3);
        assert_eq!(site.outcome().scope, Scope::Filtered);
    }

    #[tokio::test]
    async fn test_query_and_image_flag() {
        let mut site = state();
        site.load(&three_article_store()).await.unwrap();
        site.set_show_images(false);
        assert_eq!(site.outcome().mode, RenderMode::Thumbnail);

        let outcome = site.apply_query("мартенски");
        assert_eq!(outcome.articles.len(), 1);
        assert_eq!(outcome.mode, RenderMode::Highlight);
        assert_eq!(site.list_view.bindings().len(), 1);
        assert_eq!(site.suggestions("ма").len(), 1);

        site.toggle("-mar", true).unwrap();
        assert_eq!(site.clear_selection().count, 0);
        assert!(!site.list_view.markup().contains("checked"));
    }
}
