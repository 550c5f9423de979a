use mj_core::Article;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::catalog::ArticleCatalog;
use crate::format::escape;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;
pub const MIN_SUGGESTION_CHARS: usize = 2;

/// How article cards are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Full card with the primary image.
    Full,
    /// Small card with a thumbnail of the primary image.
    Thumbnail,
    /// Thumbnail card with the query marked in the title.
    Highlight,
}

impl RenderMode {
    pub fn for_query(normalized_query: &str, show_images: bool) -> Self {
        match (normalized_query.is_empty(), show_images) {
            (false, _) => RenderMode::Highlight,
            (true, true) => RenderMode::Full,
            (true, false) => RenderMode::Thumbnail,
        }
    }
}

/// Which view a result list came from; picks the caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Initial,
    Filtered,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub articles: Vec<Article>,
    /// The normalized query; empty for the initial view.
    pub query: String,
    pub mode: RenderMode,
    pub scope: Scope,
}

impl SearchOutcome {
    pub fn highlighter(&self) -> Highlighter {
        Highlighter::new(&self.query)
    }
}

pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Substring match over title, content and excerpt. `needle` must
/// already be normalized.
pub fn matches(article: &Article, needle: &str) -> bool {
    article.title.to_lowercase().contains(needle)
        || article.content.to_lowercase().contains(needle)
        || article
            .excerpt
            .as_deref()
            .is_some_and(|excerpt| excerpt.to_lowercase().contains(needle))
}

/// Run one filter pass. Matches keep the order of `all`.
pub fn search(catalog: &ArticleCatalog, raw_query: &str, show_images: bool) -> SearchOutcome {
    let query = normalize_query(raw_query);
    let mode = RenderMode::for_query(&query, show_images);
    if query.is_empty() {
        return SearchOutcome {
            articles: catalog.initial().to_vec(),
            query,
            mode,
            scope: Scope::Initial,
        };
    }

    let articles = catalog
        .all()
        .iter()
        .filter(|article| matches(article, &query))
        .cloned()
        .collect();
    SearchOutcome {
        articles,
        query,
        mode,
        scope: Scope::Filtered,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
}

/// Dropdown entries for the search box, computed independently of the
/// main filter pass.
pub fn suggestions(catalog: &ArticleCatalog, raw_query: &str, limit: usize) -> Vec<Suggestion> {
    let query = normalize_query(raw_query);
    if query.chars().count() < MIN_SUGGESTION_CHARS {
        return Vec::new();
    }
    catalog
        .all()
        .iter()
        .filter(|article| {
            article.title.to_lowercase().contains(&query)
                || article
                    .excerpt
                    .as_deref()
                    .is_some_and(|excerpt| excerpt.to_lowercase().contains(&query))
        })
        .take(limit)
        .map(|article| Suggestion {
            id: article.id.clone(),
            title: article.title.clone(),
        })
        .collect()
}

/// Wraps every case-insensitive occurrence of a literal query in
/// `<mark class="search-highlight">`. Everything else is HTML-escaped.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        let pattern = if query.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self { pattern }
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn highlight(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return escape(text).into_owned();
        };
        let mut out = String::with_capacity(text.len() + 32);
        let mut last = 0;
        for found in pattern.find_iter(text) {
            out.push_str(&escape(&text[last..found.start()]));
            out.push_str("<mark class=\"search-highlight\">");
            out.push_str(&escape(found.as_str()));
            out.push_str("</mark>");
            last = found.end();
        }
        out.push_str(&escape(&text[last..]));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::article;

    fn catalog() -> ArticleCatalog {
        let mut recipe = article("-r", "Рецепта за баница", "2024-01-10");
        recipe.content = "Брашно, яйца, сирене".to_string();
        let mut trip = article("-t", "Екскурзия до Рила", "2024-02-10");
        trip.excerpt = Some("Кратко резюме за планината".to_string());
        let dance = article("-d", "Пролетен бал", "2024-03-10");
        ArticleCatalog::from_articles(vec![recipe, trip, dance], 6)
    }

    #[test]
    fn test_render_mode_table() {
        assert_eq!(RenderMode::for_query("", true), RenderMode::Full);
        assert_eq!(RenderMode::for_query("", false), RenderMode::Thumbnail);
        assert_eq!(RenderMode::for_query("бал", true), RenderMode::Highlight);
        assert_eq!(RenderMode::for_query("бал", false), RenderMode::Highlight);
    }

    #[test]
    fn test_empty_query_returns_initial_view() {
        let outcome = search(&catalog(), "   ", true);
        assert_eq!(outcome.scope, Scope::Initial);
        assert_eq!(outcome.mode, RenderMode::Full);
        assert_eq!(outcome.articles[0].id, "-d");
        assert!(!outcome.highlighter().is_active());
    }

    #[test]
    fn test_query_matches_title_content_and_excerpt() {
        let catalog = catalog();
        assert_eq!(search(&catalog, "  РЕЦЕПТА ", true).articles.len(), 1);
        assert_eq!(search(&catalog, "сирене", true).articles[0].id, "-r");
        assert_eq!(search(&catalog, "планината", true).articles[0].id, "-t");

        let outcome = search(&catalog, "е", true);
        let ids: Vec<_> = outcome.articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["-r", "-t", "-d"]);
        assert_eq!(outcome.scope, Scope::Filtered);
        assert_eq!(outcome.query, "е");
    }

    #[test]
    fn test_metacharacters_match_literally() {
        let mut odd = article("-x", "Формула a.b*c (нова)", "2024-04-01");
        odd.content = String::new();
        let plain = article("-y", "aXbbbc", "2024-04-02");
        let catalog = ArticleCatalog::from_articles(vec![odd, plain], 6);

        for query in ["a.b*c", "(нова)", "[", "\\", "+?", "$^"] {
            let outcome = search(&catalog, query, true);
            assert!(outcome.articles.iter().all(|a| a.id != "-y"), "query {query} leaked");
            let _ = outcome.highlighter().highlight("a.b*c [ ] \\ $^ +?");
        }
        assert_eq!(search(&catalog, "a.b*c", true).articles.len(), 1);

        let marked = Highlighter::new("a.b*c").highlight("aXbbbc и a.b*c");
        assert_eq!(marked, "aXbbbc и <mark class=\"search-highlight\">a.b*c</mark>");
    }

    #[test]
    fn test_highlight_every_occurrence_case_insensitive() {
        let marked = Highlighter::new("бал").highlight("Бал след бала");
        assert_eq!(
            marked,
            "<mark class=\"search-highlight\">Бал</mark> след <mark class=\"search-highlight\">бал</mark>а"
        );
    }

    #[test]
    fn test_highlight_escapes_surrounding_text() {
        let marked = Highlighter::new("x").highlight("<b>x</b>");
        assert_eq!(marked, "&lt;b&gt;<mark class=\"search-highlight\">x</mark>&lt;/b&gt;");
        assert_eq!(Highlighter::new("").highlight("<i>"), "&lt;i&gt;");
    }

    #[test]
    fn test_suggestions() {
        let catalog = catalog();
        assert!(suggestions(&catalog, "р", 5).is_empty());
        assert!(suggestions(&catalog, " р ", 5).is_empty());

        let found = suggestions(&catalog, "ре", 5);
        assert_eq!(found[0].id, "-r");
        assert!(found.iter().any(|s| s.id == "-t"));

        // content alone does not suggest
        assert!(suggestions(&catalog, "сирене", 5).is_empty());

        let many: Vec<_> = (0..8)
            .map(|i| article(&format!("-{i}"), "Новини от клуба", "2024-01-01"))
            .collect();
        let catalog = ArticleCatalog::from_articles(many, 6);
        assert_eq!(suggestions(&catalog, "новини", DEFAULT_SUGGESTION_LIMIT).len(), 5);
    }
}
