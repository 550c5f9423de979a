use mj_core::types::truncate_chars;
use mj_core::{Article, Rubric, RubricType};
use std::fmt::Write;

use crate::format::{escape, escape_attr, format_date};
use crate::render::articles::article_link;

pub const PREVIEW_CHARS: usize = 200;
pub const MAX_CARD_TAGS: usize = 3;

pub fn render_rubric_card(rubric: &Rubric) -> String {
    let info = rubric.rubric_type.info();
    let preview = truncate_chars(&rubric.content, PREVIEW_CHARS);

    let mut html = format!(
        "<div class=\"rubric-card\"><div class=\"rubric-header\">\
         <div class=\"rubric-type-badge {}\">{}</div>\
         <h3 class=\"rubric-title\">{}</h3></div>",
        rubric.rubric_type.id(),
        escape(info.name),
        escape(&rubric.title),
    );
    if let Some(image) = rubric.image_url.as_deref().filter(|url| !url.trim().is_empty()) {
        let _ = write!(
            html,
            "<div class=\"rubric-image\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></div>",
            escape_attr(image),
            escape_attr(&rubric.title)
        );
    }
    html.push_str("<div class=\"rubric-content\">");
    for paragraph in preview.split('\n') {
        let _ = write!(html, "<p>{}</p>", escape(paragraph));
    }
    let _ = write!(
        html,
        "</div><div class=\"rubric-footer\"><div class=\"rubric-meta\">\
         <span class=\"author\">👤 {}</span><span class=\"date\">📅 {}</span></div>",
        escape(&rubric.author),
        format_date(&rubric.date),
    );
    let tags = rubric.tag_list();
    if !tags.is_empty() {
        html.push_str("<div class=\"rubric-tags\">");
        for tag in tags.into_iter().take(MAX_CARD_TAGS) {
            let _ = write!(html, "<span class=\"tag\">#{}</span>", escape(tag));
        }
        html.push_str("</div>");
    }
    html.push_str("</div></div>");
    html
}

/// Public rubric listing; `filter` of `None` shows every type.
pub fn render_rubric_list(rubrics: &[Rubric], filter: Option<RubricType>) -> String {
    let shown: Vec<&Rubric> = rubrics
        .iter()
        .filter(|rubric| filter.map_or(true, |t| rubric.rubric_type == t))
        .collect();
    if shown.is_empty() {
        return render_rubric_empty_state(filter);
    }
    let scope = match filter {
        Some(t) => format!("в рубрика \"{}\"", escape(t.info().name)),
        None => "от всички рубрики".to_string(),
    };
    let cards: String = shown.iter().map(|rubric| render_rubric_card(rubric)).collect();
    format!(
        "<div class=\"rubrics-count\"><span>Показваме {} публикации {}</span></div>\
         <div class=\"rubrics-grid\">{}</div>",
        shown.len(),
        scope,
        cards
    )
}

pub fn render_rubric_empty_state(filter: Option<RubricType>) -> String {
    let detail = match filter {
        Some(t) => format!("Все още няма публикации в рубрика \"{}\".", escape(t.info().name)),
        None => "Все още няма публикувани рубрики.".to_string(),
    };
    format!(
        "<div class=\"empty-rubrics\"><div class=\"empty-icon\">📭</div>\
         <h3>Все още няма публикации</h3><p>{}</p></div>",
        detail
    )
}

/// Type picker of the rubric browser with the article count of each type.
pub fn render_rubric_type_cards(counts: &[(RubricType, usize)]) -> String {
    counts
        .iter()
        .map(|(rubric_type, count)| {
            let info = rubric_type.info();
            format!(
                "<div class=\"rubric-type-card\" data-rubric-id=\"{}\" style=\"--color: {}\">\
                 <div class=\"rubric-icon\">{}</div>\
                 <div class=\"rubric-content\"><h3>{}</h3>\
                 <p class=\"rubric-description\">{}</p>\
                 <div class=\"rubric-stats\"><span class=\"article-count\">{} статии</span></div>\
                 </div></div>",
                rubric_type.id(),
                info.color,
                info.icon,
                escape(info.name),
                escape(info.description),
                count
            )
        })
        .collect()
}

/// One page of articles filed under a rubric, with the "load more" button
/// when further pages exist.
pub fn render_rubric_articles(rubric_type: RubricType, articles: &[Article], has_more: bool) -> String {
    if articles.is_empty() {
        return format!(
            "<div class=\"empty-state\"><div class=\"empty-icon\">📭</div>\
             <h3>Няма статии</h3><p>Все още няма статии в рубрика \"{}\".</p></div>",
            escape(rubric_type.info().name)
        );
    }
    let mut html = String::new();
    for article in articles {
        html.push_str("<div class=\"article-card\">");
        if let Some(image) = article.primary_image() {
            let _ = write!(
                html,
                "<div class=\"article-image\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></div>",
                escape_attr(image),
                escape_attr(&article.title)
            );
        }
        let _ = write!(
            html,
            "<div class=\"article-content\"><h3>{}</h3>\
             <p class=\"article-excerpt\">{}</p>\
             <div class=\"article-meta\"><span class=\"article-author\">✍️ {}</span>\
             <span class=\"article-date\">📅 {}</span></div>\
             <a href=\"{}\" class=\"read-more\">Прочети повече →</a></div></div>",
            escape(&article.title),
            escape(&article.excerpt()),
            escape(&article.author),
            format_date(&article.date),
            article_link(&article.id),
        );
    }
    if has_more {
        html.push_str("<div class=\"load-more\"><button class=\"btn\" data-action=\"load-more\">Зареди още</button></div>");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rubric(rubric_type: RubricType, title: &str) -> Rubric {
        Rubric {
            id: format!("-{}", title),
            rubric_type,
            title: title.to_string(),
            content: "Ред едно\nРед две".to_string(),
            author: "Ели".to_string(),
            date: "2024-03-05T10:00:00Z".to_string(),
            image_url: None,
            tags: Some("a, b, c, d".to_string()),
            published: true,
        }
    }

    #[test]
    fn test_rubric_card() {
        let mut card = rubric(RubricType::Recipes, "Мусака");
        card.content = "х".repeat(250);
        let html = render_rubric_card(&card);
        assert!(html.contains("rubric-type-badge recipes"));
        assert!(html.contains("🍽️ Рецепти"));
        assert!(html.contains(&format!("{}...", "х".repeat(200))));
        assert_eq!(html.matches("class=\"tag\"").count(), 3);
        assert!(!html.contains("#d"));
        assert!(!html.contains("rubric-image"));
        assert!(html.contains("5 март 2024 г."));

        card.image_url = Some("m.jpg".into());
        card.tags = None;
        let html = render_rubric_card(&card);
        assert!(html.contains("<img src=\"m.jpg\""));
        assert!(!html.contains("rubric-tags"));
    }

    #[test]
    fn test_multiline_preview_becomes_paragraphs() {
        let html = render_rubric_card(&rubric(RubricType::Jokes, "Виц"));
        assert!(html.contains("<p>Ред едно</p><p>Ред две</p>"));
    }

    #[test]
    fn test_rubric_list_filters_and_empty_states() {
        let rubrics = vec![rubric(RubricType::Jokes, "Виц"), rubric(RubricType::Recipes, "Супа")];
        let all = render_rubric_list(&rubrics, None);
        assert!(all.contains("Показваме 2 публикации от всички рубрики"));

        let jokes = render_rubric_list(&rubrics, Some(RubricType::Jokes));
        assert!(jokes.contains("Показваме 1 публикации в рубрика \"😂 Шеги\""));

        let empty = render_rubric_list(&rubrics, Some(RubricType::Interesting));
        assert!(empty.contains("Все още няма публикации в рубрика \"🔍 Интересно\"."));
        assert!(render_rubric_list(&[], None).contains("Все още няма публикувани рубрики."));
    }

    #[test]
    fn test_type_cards_show_counts() {
        let html = render_rubric_type_cards(&[(RubricType::Recipes, 4), (RubricType::Jokes, 0)]);
        assert!(html.contains("data-rubric-id=\"recipes\""));
        assert!(html.contains("4 статии"));
        assert!(html.contains("0 статии"));
    }
}
