use chrono::{DateTime, Utc};
use mj_core::Article;
use scraper::{Html, Selector};
use serde::Serialize;
use std::fmt::Write;

use crate::format::{escape, escape_attr, format_date, long_date};
use crate::newspaper::template::{render_footer, render_header, NewspaperStats, MASTHEAD};

pub const AI_WRAPPER_SELECTOR: &str = "div.ai-newspaper";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptArticle<'a> {
    title: &'a str,
    author: &'a str,
    category: &'a str,
    date: String,
    content: &'a str,
    image_url: Option<&'a str>,
}

/// One prompt carrying every collected article as JSON.
pub fn build_prompt(articles: &[Article], issue_date: &DateTime<Utc>) -> String {
    let payload: Vec<PromptArticle<'_>> = articles
        .iter()
        .map(|article| PromptArticle {
            title: &article.title,
            author: &article.author,
            category: article.category.label(),
            date: format_date(&article.date),
            content: &article.content,
            image_url: article.primary_image(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Създай брой на училищния вестник „{}“ от {} от статиите по-долу.\n\
         Върни само HTML, обвит в <div class=\"ai-newspaper\">...</div>.\n\
         Първата статия е водеща. Запази заглавията, авторите и изображенията.\n\
         Не добавяй скриптове и външни стилове.\n\n\
         Статии:\n{}",
        MASTHEAD,
        long_date(issue_date),
        json
    )
}

/// Pull the `div.ai-newspaper` element out of a model response. Responses
/// carrying scripts are rejected.
pub fn extract_fragment(response: &str) -> Option<String> {
    let document = Html::parse_fragment(response);
    let wrapper = Selector::parse(AI_WRAPPER_SELECTOR).ok()?;
    let script = Selector::parse("script").ok()?;

    let element = document.select(&wrapper).next()?;
    if element.select(&script).next().is_some() {
        return None;
    }
    Some(element.html())
}

/// Local stand-in for a response without a recognisable fragment.
pub fn synthesize_fragment(articles: &[Article]) -> String {
    let mut html = String::from("<div class=\"ai-newspaper\">");
    for (index, article) in articles.iter().enumerate() {
        let class = if index == 0 { "ai-article lead-story" } else { "ai-article" };
        let _ = write!(
            html,
            "<section class=\"{}\"><h2>{}</h2><p class=\"ai-byline\">✍️ {}</p>",
            class,
            escape(&article.title),
            escape(&article.author)
        );
        if let Some(image) = article.primary_image() {
            let _ = write!(
                html,
                "<img src=\"{}\" alt=\"{}\">",
                escape_attr(image),
                escape_attr(&article.title)
            );
        }
        for paragraph in article.paragraphs() {
            let _ = write!(html, "<p>{}</p>", escape(paragraph));
        }
        html.push_str("</section>");
    }
    html.push_str("</div>");
    html
}

pub fn render_ai(fragment: &str, articles: &[Article], issue_date: &DateTime<Utc>) -> String {
    format!(
        "<div class=\"newspaper ai-generated\">{}<main class=\"newspaper-body\">{}</main>{}</div>",
        render_header(issue_date),
        fragment,
        render_footer(&NewspaperStats::of(articles), issue_date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::article;
    use chrono::TimeZone;

    #[test]
    fn test_prompt_carries_articles() {
        let issue = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        let prompt = build_prompt(&[article("-a", "Пролетен бал", "2024-03-01")], &issue);
        assert!(prompt.starts_with("Създай брой на училищния вестник „Млад Журналист“ от 15 март 2024 г."));
        assert!(prompt.contains("\"title\": \"Пролетен бал\""));
        assert!(prompt.contains("\"imageUrl\": \"https://img.example/a.jpg\""));
    }

    #[test]
    fn test_extract_fragment() {
        let response = "Ето вестника:\n```html\n<div class=\"intro\">x</div>\
                        <div class=\"ai-newspaper\"><h2>Бал</h2><p>Текст</p></div>\n```";
        let fragment = extract_fragment(response).unwrap();
        assert!(fragment.starts_with("<div class=\"ai-newspaper\">"));
        assert!(fragment.contains("<h2>Бал</h2>"));
        assert!(!fragment.contains("intro"));
    }

    #[test]
    fn test_extract_misses() {
        assert!(extract_fragment("само текст без HTML").is_none());
        assert!(extract_fragment("<div class=\"newspaper\">x</div>").is_none());
        assert!(extract_fragment("<div class=\"ai-newspaper\"><script>alert(1)</script></div>").is_none());
    }

    #[test]
    fn test_synthesized_fragment() {
        let mut second = article("-b", "Второ", "2024-01-01");
        second.images.clear();
        let html = synthesize_fragment(&[article("-a", "Първо", "2024-02-01"), second]);
        assert!(html.starts_with("<div class=\"ai-newspaper\">"));
        assert_eq!(html.matches("lead-story").count(), 1);
        assert_eq!(html.matches("<img").count(), 1);
        assert!(extract_fragment(&html).is_some());
    }
}
