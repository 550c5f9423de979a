//! Markup builders. Everything here is a pure function of its inputs.

pub mod articles;
pub mod events;
pub mod feedback;
pub mod rubrics;
pub mod stats;

pub use articles::{
    render_article_error, render_article_list, render_article_page, render_suggestions,
    result_caption, ArticleListView, CheckboxBinding,
};
pub use events::{render_admin_events, render_timeline};
pub use feedback::{render_loading, ErrorPanel, ErrorPanels, Message};
pub use rubrics::{render_rubric_articles, render_rubric_list, render_rubric_type_cards};
pub use stats::render_rubric_statistics;
