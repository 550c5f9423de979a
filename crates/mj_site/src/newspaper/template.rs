use chrono::{DateTime, Datelike, Utc};
use mj_core::{Article, Category};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt::Write;

use crate::format::{escape, escape_attr, format_date, long_date};

pub const MASTHEAD: &str = "Млад Журналист";
pub const SUBTITLE: &str = "Училищен вестник";

/// Footer numbers of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NewspaperStats {
    pub article_count: usize,
    pub image_count: usize,
    pub author_count: usize,
}

impl NewspaperStats {
    pub fn of(articles: &[Article]) -> Self {
        let authors: BTreeSet<&str> = articles
            .iter()
            .map(|article| article.author.trim())
            .filter(|author| !author.is_empty())
            .collect();
        Self {
            article_count: articles.len(),
            image_count: articles.iter().map(|article| article.images.len()).sum(),
            author_count: authors.len(),
        }
    }
}

/// Newest first; the first article becomes the lead story.
pub fn order_articles(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by_key(|article| Reverse(article.sort_key()));
    articles
}

pub fn render_header(issue_date: &DateTime<Utc>) -> String {
    format!(
        "<header class=\"newspaper-header\">\
         <h1 class=\"newspaper-title\">{}</h1>\
         <p class=\"newspaper-subtitle\">{}</p>\
         <div class=\"newspaper-date\">Брой от {}</div>\
         </header>",
        MASTHEAD,
        SUBTITLE,
        long_date(issue_date)
    )
}

pub fn render_footer(stats: &NewspaperStats, issue_date: &DateTime<Utc>) -> String {
    format!(
        "<footer class=\"newspaper-footer\"><div class=\"newspaper-stats\">\
         <span class=\"stat\" data-stat=\"articles\">Статии: {}</span>\
         <span class=\"stat\" data-stat=\"images\">Снимки: {}</span>\
         <span class=\"stat\" data-stat=\"authors\">Автори: {}</span>\
         </div><p class=\"newspaper-copyright\">© {} {}</p></footer>",
        stats.article_count,
        stats.image_count,
        stats.author_count,
        MASTHEAD,
        issue_date.year()
    )
}

fn render_section(article: &Article, lead: bool, html: &mut String) {
    let (class, heading) = if lead {
        ("newspaper-article lead-story", "h2")
    } else {
        ("newspaper-article", "h3")
    };
    let _ = write!(
        html,
        "<article class=\"{}\" data-article-id=\"{}\">\
         <{} class=\"newspaper-article-title\">{}</{}>\
         <div class=\"newspaper-article-meta\"><span>✍️ {}</span><span>📅 {}</span></div>\
         <div class=\"newspaper-tags\"><span class=\"newspaper-tag\">#{}</span>",
        class,
        escape_attr(&article.id),
        heading,
        escape(&article.title),
        heading,
        escape(&article.author),
        format_date(&article.date),
        escape(article.category.label()),
    );
    if let Some(rubric) = article.rubric.filter(|r| article.category != Category::Rubric(*r)) {
        let _ = write!(html, "<span class=\"newspaper-tag\">#{}</span>", escape(rubric.info().name));
    }
    html.push_str("</div>");
    if !article.images.is_empty() {
        html.push_str("<div class=\"newspaper-images\">");
        for image in &article.images {
            let _ = write!(
                html,
                "<img src=\"{}\" alt=\"{}\">",
                escape_attr(image),
                escape_attr(&article.title)
            );
        }
        html.push_str("</div>");
    }
    html.push_str("<div class=\"newspaper-article-body\">");
    for paragraph in article.paragraphs() {
        let _ = write!(html, "<p>{}</p>", escape(paragraph));
    }
    html.push_str("</div></article>");
}

/// The fixed local layout. `articles` must already be in issue order.
pub fn render_basic(articles: &[Article], issue_date: &DateTime<Utc>) -> String {
    let mut html = String::from("<div class=\"newspaper\">");
    html.push_str(&render_header(issue_date));
    html.push_str("<main class=\"newspaper-body\">");
    for (index, article) in articles.iter().enumerate() {
        render_section(article, index == 0, &mut html);
    }
    html.push_str("</main>");
    html.push_str(&render_footer(&NewspaperStats::of(articles), issue_date));
    html.push_str("</div>");
    html
}
