use mj_core::{Article, RubricType};
use std::cmp::Reverse;

use crate::catalog::ArticleCatalog;
use crate::render::rubrics::{render_rubric_articles, render_rubric_type_cards};

pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Browses catalog articles filed under a rubric, a page at a time.
#[derive(Debug, Clone)]
pub struct RubricBrowser {
    page_size: usize,
    current: Option<RubricType>,
    matching: Vec<Article>,
    shown: usize,
}

impl Default for RubricBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl RubricBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: None,
            matching: Vec::new(),
            shown: 0,
        }
    }

    pub fn counts(catalog: &ArticleCatalog) -> Vec<(RubricType, usize)> {
        RubricType::ALL
            .iter()
            .map(|&rubric_type| {
                let count = catalog
                    .all()
                    .iter()
                    .filter(|article| article.in_rubric(rubric_type))
                    .count();
                (rubric_type, count)
            })
            .collect()
    }

    pub fn open(&mut self, catalog: &ArticleCatalog, rubric_type: RubricType) -> &[Article] {
        let mut matching: Vec<Article> = catalog
            .all()
            .iter()
            .filter(|article| article.in_rubric(rubric_type))
            .cloned()
            .collect();
        matching.sort_by_key(|article| Reverse(article.sort_key()));
        self.current = Some(rubric_type);
        self.shown = matching.len().min(self.page_size);
        self.matching = matching;
        self.visible()
    }

    /// Show one more page; returns `false` when everything was already shown.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.shown = (self.shown + self.page_size).min(self.matching.len());
        true
    }

    pub fn back(&mut self) {
        self.current = None;
        self.matching.clear();
        self.shown = 0;
    }

    pub fn current(&self) -> Option<RubricType> {
        self.current
    }

    pub fn visible(&self) -> &[Article] {
        &self.matching[..self.shown]
    }

    pub fn total(&self) -> usize {
        self.matching.len()
    }

    pub fn has_more(&self) -> bool {
        self.shown < self.matching.len()
    }

    /// Type cards when no rubric is open, otherwise the visible page.
    pub fn render(&self, catalog: &ArticleCatalog) -> String {
        match self.current {
            None => render_rubric_type_cards(&Self::counts(catalog)),
            Some(rubric_type) => render_rubric_articles(rubric_type, self.visible(), self.has_more()),
        }
    }
}
