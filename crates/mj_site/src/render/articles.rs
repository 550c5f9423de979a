use mj_core::Article;
use serde::Serialize;
use std::fmt::Write;

use crate::format::{escape, escape_attr, format_date};
use crate::search::{Highlighter, RenderMode, Scope, SearchOutcome, Suggestion};
use crate::selection::{SelectionControls, SelectionSet};

pub const NO_ARTICLES: &str = "Няма намерени статии";
pub const NO_RESULTS_CAPTION: &str = "Няма намерени статии, отговарящи на търсенето.";
pub const NO_CONTENT: &str = "Съдържанието не е налично.";

pub fn result_caption(count: usize, scope: Scope) -> String {
    match (count, scope) {
        (0, _) => NO_RESULTS_CAPTION.to_string(),
        (n, Scope::Initial) => format!("Показване на най-новите {} статии", n),
        (n, Scope::Filtered) => format!("Намерени {} статии", n),
    }
}

pub fn article_link(id: &str) -> String {
    format!("article.html?id={}", escape_attr(id))
}

pub fn render_article_card(
    article: &Article,
    mode: RenderMode,
    highlighter: &Highlighter,
    selected: bool,
) -> String {
    let id = escape_attr(&article.id);
    let title = match mode {
        RenderMode::Highlight => highlighter.highlight(&article.title),
        _ => escape(&article.title).into_owned(),
    };
    let card_class = match mode {
        RenderMode::Full => "article-card",
        RenderMode::Thumbnail | RenderMode::Highlight => "article-card thumbnail",
    };

    let mut html = String::new();
    let _ = write!(html, "<article class=\"{}\" data-article-id=\"{}\">", card_class, id);
    let _ = write!(
        html,
        "<label class=\"article-select\"><input type=\"checkbox\" class=\"article-checkbox\" data-article-id=\"{}\"{}></label>",
        id,
        if selected { " checked" } else { "" }
    );
    if let Some(image) = article.primary_image() {
        let wrapper = match mode {
            RenderMode::Full => "article-card-image",
            _ => "article-card-thumb",
        };
        let _ = write!(
            html,
            "<div class=\"{}\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></div>",
            wrapper,
            escape_attr(image),
            escape_attr(&article.title)
        );
    }
    let _ = write!(
        html,
        "<div class=\"article-card-content\">\
         <span class=\"article-category\">{}</span>\
         <h3 class=\"article-card-title\">{}</h3>\
         <p class=\"article-card-excerpt\">{}</p>\
         <div class=\"article-card-meta\">\
         <span class=\"article-author\">✍️ {}</span>\
         <span class=\"article-date\">📅 {}</span>\
         </div>\
         <a href=\"{}\" class=\"article-read-more\">Прочети повече →</a>\
         </div></article>",
        escape(article.category.label()),
        title,
        escape(&article.excerpt()),
        escape(&article.author),
        format_date(&article.date),
        article_link(&article.id),
    );
    html
}

/// Markup of the article grid for one search outcome.
pub fn render_article_list(outcome: &SearchOutcome, selection: &SelectionSet) -> String {
    if outcome.articles.is_empty() {
        return format!("<div class=\"no-articles\">{}</div>", NO_ARTICLES);
    }
    let highlighter = outcome.highlighter();
    outcome
        .articles
        .iter()
        .map(|article| {
            render_article_card(article, outcome.mode, &highlighter, selection.contains(&article.id))
        })
        .collect()
}

pub fn render_suggestions(suggestions: &[Suggestion], query: &str) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let highlighter = Highlighter::new(query);
    let items: String = suggestions
        .iter()
        .map(|s| {
            format!(
                "<li class=\"search-suggestion\"><a href=\"{}\">{}</a></li>",
                article_link(&s.id),
                highlighter.highlight(&s.title)
            )
        })
        .collect();
    format!("<ul class=\"search-suggestions\">{}</ul>", items)
}

/// The single-article page: header, every image, then the body.
pub fn render_article_page(article: &Article) -> String {
    let mut html = format!(
        "<div class=\"article-header\">\
         <h1 class=\"article-title\">{}</h1>\
         <div class=\"article-meta\">\
         <span>✍️ {}</span><span>📅 {}</span><span>🏷️ {}</span>\
         </div></div>",
        escape(&article.title),
        escape(&article.author),
        format_date(&article.date),
        escape(article.category.label()),
    );
    for image in &article.images {
        let _ = write!(
            html,
            "<div class=\"article-image\"><img src=\"{}\" alt=\"{}\"></div>",
            escape_attr(image),
            escape_attr(&article.title)
        );
    }
    html.push_str("<div class=\"article-body\">");
    let mut paragraphs = article.paragraphs().peekable();
    if paragraphs.peek().is_none() {
        let _ = write!(html, "<p>{}</p>", NO_CONTENT);
    }
    for paragraph in paragraphs {
        let _ = write!(html, "<p>{}</p>", escape(paragraph));
    }
    html.push_str("</div>");
    html
}

/// Inline error in place of the article body.
pub fn render_article_error(message: &str) -> String {
    format!("<div class=\"error-message\">{}</div>", escape(message))
}

/// A checkbox listener attached to one rendered card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckboxBinding {
    pub article_id: String,
}

/// The article grid container. Every render replaces the markup and the
/// full set of checkbox bindings, then recomputes the selection controls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticleListView {
    markup: String,
    caption: String,
    bindings: Vec<CheckboxBinding>,
    controls: SelectionControls,
}

impl ArticleListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, outcome: &SearchOutcome, selection: &SelectionSet) {
        self.markup = render_article_list(outcome, selection);
        self.caption = result_caption(outcome.articles.len(), outcome.scope);
        self.bindings = outcome
            .articles
            .iter()
            .map(|article| CheckboxBinding {
                article_id: article.id.clone(),
            })
            .collect();
        self.controls = selection.controls();
    }

    /// Route a checkbox change through its binding. Returns `None` when no
    /// card for `article_id` is on screen.
    pub fn toggle(
        &mut self,
        selection: &mut SelectionSet,
        article_id: &str,
        checked: bool,
    ) -> Option<SelectionControls> {
        let binding = self.bindings.iter().find(|b| b.article_id == article_id)?;
        self.controls = selection.toggle(&binding.article_id, checked);
        Some(self.controls)
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn bindings(&self) -> &[CheckboxBinding] {
        &self.bindings
    }

    pub fn controls(&self) -> SelectionControls {
        self.controls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{article, three_article_store};
    use crate::catalog::ArticleCatalog;
    use crate::search::search;

    #[test]
    fn test_captions() {
        assert_eq!(result_caption(0, Scope::Initial), NO_RESULTS_CAPTION);
        assert_eq!(result_caption(3, Scope::Initial), "Показване на най-новите 3 статии");
        assert_eq!(result_caption(1, Scope::Filtered), "Намерени 1 статии");
    }

    #[tokio::test]
    async fn test_initial_view_renders_full_cards_newest_first() {
        let mut catalog = ArticleCatalog::default();
        catalog.load_all(&three_article_store()).await.unwrap();
        let outcome = search(&catalog, "", true);

        let mut view = ArticleListView::new();
        view.render(&outcome, &SelectionSet::new());
        let html = view.markup();
        assert_eq!(html.matches("class=\"article-card\"").count(), 3);
        assert_eq!(html.matches("article-card-image").count(), 3);
        let mar = html.find("Мартенски").unwrap();
        let feb = html.find("Февруарски").unwrap();
        let jan = html.find("Януарски").unwrap();
        assert!(mar < feb && feb < jan);
        assert_eq!(view.caption(), "Показване на най-новите 3 статии");
        assert!(html.contains("1 март 2024 г."));
    }

    #[test]
    fn test_query_renders_thumbnails_with_one_highlight() {
        let catalog = ArticleCatalog::from_articles(
            vec![
                article("-1", "Рецепта за козунак", "2024-04-01"),
                article("-2", "Пролетен бал", "2024-04-02"),
                article("-3", "Интервю с директора", "2024-04-03"),
            ],
            6,
        );
        let outcome = search(&catalog, "рецепта", true);
        assert_eq!(outcome.articles.len(), 1);
        assert_eq!(outcome.mode, RenderMode::Highlight);

        let html = render_article_list(&outcome, &SelectionSet::new());
        assert!(html.contains("article-card thumbnail"));
        assert!(html.contains("article-card-thumb"));
        assert_eq!(html.matches("<mark class=\"search-highlight\">").count(), 1);
        assert!(html.contains("<mark class=\"search-highlight\">Рецепта</mark> за козунак"));
        assert_eq!(result_caption(outcome.articles.len(), outcome.scope), "Намерени 1 статии");
    }

    #[test]
    fn test_empty_list_renders_placeholder() {
        let outcome = search(&ArticleCatalog::default(), "", true);
        let mut view = ArticleListView::new();
        view.render(&outcome, &SelectionSet::new());
        assert_eq!(view.markup(), "<div class=\"no-articles\">Няма намерени статии</div>");
        assert_eq!(view.caption(), NO_RESULTS_CAPTION);
        assert!(view.bindings().is_empty());
        assert!(!view.controls().build_enabled);
    }

    #[test]
    fn test_rerender_replaces_bindings() {
        let catalog = ArticleCatalog::from_articles(
            vec![
                article("-1", "Бал", "2024-04-01"),
                article("-2", "Бал отново", "2024-04-02"),
                article("-3", "Театър", "2024-04-03"),
            ],
            6,
        );
        let mut selection = SelectionSet::new();
        let mut view = ArticleListView::new();

        let initial = search(&catalog, "", true);
        view.render(&initial, &selection);
        let first_markup = view.markup().to_string();
        view.render(&initial, &selection);
        assert_eq!(view.markup(), first_markup);
        assert_eq!(view.bindings().len(), 3);

        let controls = view.toggle(&mut selection, "-1", true).unwrap();
        assert_eq!(controls.count, 1);
        assert!(controls.build_enabled);

        let filtered = search(&catalog, "театър", true);
        view.render(&filtered, &selection);
        assert_eq!(view.bindings(), &[CheckboxBinding { article_id: "-3".into() }]);
        assert_eq!(view.controls().count, 1);
        assert!(view.toggle(&mut selection, "-1", false).is_none());
        assert!(selection.contains("-1"));

        view.render(&initial, &selection);
        assert_eq!(view.bindings().len(), 3);
        assert!(view.markup().contains("data-article-id=\"-1\" checked"));
        // toggling twice through the fresh bindings changes the set once each
        assert_eq!(view.toggle(&mut selection, "-2", true).unwrap().count, 2);
        assert_eq!(view.toggle(&mut selection, "-2", true).unwrap().count, 2);
    }

    #[test]
    fn test_user_data_is_escaped() {
        let mut nasty = article("-x\"", "<script>alert(1)</script>", "2024-01-01");
        nasty.author = "Том & Джери".into();
        let html = render_article_card(&nasty, RenderMode::Full, &Highlighter::new(""), false);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Том &amp; Джери"));
        assert!(html.contains("data-article-id=\"-x&quot;\""));
    }

    #[test]
    fn test_article_page() {
        let mut piece = article("-p", "Интервю", "2024-03-01");
        piece.images = vec!["a.jpg".into(), "b.jpg".into()];
        piece.content = "Първи ред\n\n  \nВтори ред".into();
        let html = render_article_page(&piece);
        assert_eq!(html.matches("<div class=\"article-image\">").count(), 2);
        assert!(html.contains("<p>Първи ред</p><p>Втори ред</p>"));
        assert!(html.contains("🏷️ Новини"));

        piece.content = "  \n ".into();
        assert!(render_article_page(&piece).contains("<p>Съдържанието не е налично.</p>"));

        piece.date = "утре".into();
        assert!(render_article_page(&piece).contains("Невалидна дата"));
    }

    #[test]
    fn test_suggestion_markup() {
        let html = render_suggestions(
            &[Suggestion { id: "-1".into(), title: "Пролетен бал".into() }],
            "бал",
        );
        assert!(html.contains("article.html?id=-1"));
        assert!(html.contains("<mark class=\"search-highlight\">бал</mark>"));
        assert_eq!(render_suggestions(&[], "бал"), "");
    }
}
