//! The newspaper builder: turns the selection into one composed issue,
//! either from the local template or through the text generator.

use chrono::{DateTime, Utc};
use mj_core::{Article, Error, Result, TextGenerator};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::ArticleCatalog;
use crate::render::feedback::{render_loading, LOADING_NEWSPAPER};
use crate::selection::SelectionSet;

pub mod ai;
pub mod export;
pub mod template;

pub use export::{download, print_view, share, Download, ShareOutcome, SharePayload, ShareTarget};
pub use template::NewspaperStats;

pub const EMPTY_SELECTION: &str = "Моля, изберете поне една статия";
pub const SUPERSEDED: &str = "Вестникът беше заменен от по-нова заявка";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Collecting,
    GeneratingAi,
    GeneratingBasic,
    Fallback,
    Ready,
}

/// The composition the user picked for this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composition {
    #[default]
    Basic,
    Ai,
}

/// Which path actually produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Basic,
    Ai,
    /// Generated by the model but its fragment was missing and rebuilt locally.
    AiSynthesized,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Newspaper {
    pub html: String,
    pub issue_date: DateTime<Utc>,
    pub stats: NewspaperStats,
    /// Article ids in issue order; the first is the lead story.
    pub article_ids: Vec<String>,
    pub source: Source,
    /// Upstream message when the model path failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl Newspaper {
    pub fn title(&self) -> String {
        format!("{} – {}", template::MASTHEAD, crate::format::long_date(&self.issue_date))
    }

    pub fn lead_id(&self) -> Option<&str> {
        self.article_ids.first().map(String::as_str)
    }
}

/// Resolve selected ids against `all`, silently dropping stale ones.
pub fn collect(catalog: &ArticleCatalog, selection: &SelectionSet) -> Vec<Article> {
    selection
        .ids()
        .filter_map(|id| catalog.find(id))
        .cloned()
        .collect()
}

/// The generator capability, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    generator: Option<Arc<dyn TextGenerator>>,
    ai_enabled: bool,
}

impl Composer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, ai_composition_enabled: bool) -> Self {
        let ai_enabled = ai_composition_enabled && generator.is_some();
        Self { generator, ai_enabled }
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn basic(&self, articles: &[Article], issue_date: DateTime<Utc>, source: Source) -> Newspaper {
        Newspaper {
            html: template::render_basic(articles, &issue_date),
            issue_date,
            stats: NewspaperStats::of(articles),
            article_ids: articles.iter().map(|a| a.id.clone()).collect(),
            source,
            fallback_reason: None,
        }
    }

    async fn ai(&self, generator: &dyn TextGenerator, articles: &[Article], issue_date: DateTime<Utc>) -> Result<Newspaper> {
        let prompt = ai::build_prompt(articles, &issue_date);
        let response = generator.generate(&prompt).await?;
        let (fragment, source) = match ai::extract_fragment(&response) {
            Some(fragment) => (fragment, Source::Ai),
            None => {
                info!("🧩 Model response had no newspaper fragment, composing it locally");
                (ai::synthesize_fragment(articles), Source::AiSynthesized)
            }
        };
        Ok(Newspaper {
            html: ai::render_ai(&fragment, articles, &issue_date),
            issue_date,
            stats: NewspaperStats::of(articles),
            article_ids: articles.iter().map(|a| a.id.clone()).collect(),
            source,
            fallback_reason: None,
        })
    }
}

/// Collected articles waiting for composition. Running a job needs no
/// access to the site state.
#[derive(Debug, Clone)]
pub struct NewspaperJob {
    generation: u64,
    articles: Vec<Article>,
    composition: Composition,
    issue_date: DateTime<Utc>,
}

impl NewspaperJob {
    /// The build this job belongs to. Pass it back to
    /// [`NewspaperBuilder::finish`] together with the result.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn composition(&self) -> Composition {
        self.composition
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub async fn run(self, composer: &Composer) -> Newspaper {
        let generator = match (self.composition, &composer.generator) {
            (Composition::Ai, Some(generator)) => generator.clone(),
            _ => return composer.basic(&self.articles, self.issue_date, Source::Basic),
        };
        info!("🤖 Composing newspaper with {} ({} articles)", generator.name(), self.articles.len());
        match composer.ai(generator.as_ref(), &self.articles, self.issue_date).await {
            Ok(newspaper) => newspaper,
            Err(e) => {
                warn!(error = %e, "newspaper generation failed, using the basic layout");
                let mut newspaper = composer.basic(&self.articles, self.issue_date, Source::Fallback);
                newspaper.fallback_reason = Some(e.to_string());
                newspaper
            }
        }
    }
}

/// Build state machine:
/// `Idle -> Collecting -> GeneratingAi | GeneratingBasic -> Ready`,
/// with `GeneratingAi -> Fallback -> Ready` when the model fails.
#[derive(Debug, Clone)]
pub struct NewspaperBuilder {
    composer: Composer,
    phase: Phase,
    history: Vec<Phase>,
    document: Option<Newspaper>,
    generation: u64,
}

impl NewspaperBuilder {
    pub fn new(composer: Composer) -> Self {
        Self {
            composer,
            phase: Phase::Idle,
            history: vec![Phase::Idle],
            document: None,
            generation: 0,
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Phases passed through since the last build started.
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn document(&self) -> Option<&Newspaper> {
        self.document.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.phase, Phase::Collecting | Phase::GeneratingAi | Phase::GeneratingBasic | Phase::Fallback)
    }

    /// Placeholder markup while an issue is being generated.
    pub fn loading_placeholder(&self) -> Option<String> {
        self.is_generating().then(|| render_loading(LOADING_NEWSPAPER))
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.history.push(phase);
    }

    /// Validate the selection and collect its articles. An empty selection
    /// is refused and leaves the builder untouched.
    pub fn begin(
        &mut self,
        catalog: &ArticleCatalog,
        selection: &SelectionSet,
        requested: Composition,
        issue_date: DateTime<Utc>,
    ) -> Result<NewspaperJob> {
        if selection.is_empty() {
            return Err(Error::validation(EMPTY_SELECTION));
        }
        self.generation += 1;
        self.history.clear();
        self.document = None;
        self.enter(Phase::Collecting);

        let articles = template::order_articles(collect(catalog, selection));
        let composition = match requested {
            Composition::Ai if self.composer.ai_enabled && !articles.is_empty() => Composition::Ai,
            _ => Composition::Basic,
        };
        self.enter(match composition {
            Composition::Ai => Phase::GeneratingAi,
            Composition::Basic => Phase::GeneratingBasic,
        });
        info!(
            "🗞️ Building newspaper from {} of {} selected articles",
            articles.len(),
            selection.size()
        );
        Ok(NewspaperJob {
            generation: self.generation,
            articles,
            composition,
            issue_date,
        })
    }

    /// Store the result of the job started as `generation`. A result from a
    /// build that was restarted or reset since is dropped and `None` comes
    /// back; the running build keeps its phase and placeholder.
    pub fn finish(&mut self, generation: u64, newspaper: Newspaper) -> Option<&Newspaper> {
        if generation != self.generation || !self.is_generating() {
            warn!(
                generation,
                current = self.generation,
                "dropping newspaper from a superseded build"
            );
            return None;
        }
        if newspaper.source == Source::Fallback {
            self.enter(Phase::Fallback);
        }
        self.enter(Phase::Ready);
        Some(self.document.insert(newspaper))
    }

    pub async fn build(
        &mut self,
        catalog: &ArticleCatalog,
        selection: &SelectionSet,
        requested: Composition,
        issue_date: DateTime<Utc>,
    ) -> Result<&Newspaper> {
        let job = self.begin(catalog, selection, requested, issue_date)?;
        let generation = job.generation();
        let newspaper = job.run(&self.composer).await;
        self.finish(generation, newspaper)
            .ok_or_else(|| Error::validation(SUPERSEDED))
    }

    /// Back to `Idle`, dropping the document.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.document = None;
        self.history.clear();
        self.enter(Phase::Idle);
    }
}
