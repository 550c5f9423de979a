use chrono::Utc;
use clap::Parser;
use mj_core::{DocumentStore, Error, Result, RubricType, SiteConfig, TextGenerator};
use mj_site::crud::rubrics::{ALL_LIMIT, BY_TYPE_LIMIT};
use mj_site::crud::{EventService, RubricService};
use mj_site::format::{format_date, format_date_time};
use mj_site::newspaper::{download, print_view};
use mj_site::{Composer, Composition, DebouncedSearch, SearchOutcome, SiteState};
use mj_storage::InMemoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Млад Журналист site engine", long_about = None)]
pub struct Cli {
    #[arg(long, help = "Document store: memory (default) or realtime")]
    storage: Option<String>,
    #[arg(long, help = "Realtime database URL")]
    store_url: Option<String>,
    #[arg(long)]
    store_auth: Option<String>,
    #[arg(long, help = "Text generator: gemini (default), deepseek or dummy")]
    model: Option<String>,
    #[arg(long)]
    model_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long, help = "Allow newspapers to be composed by the text generator")]
    ai: bool,
    #[arg(long, help = "Database export (JSON) loaded into the memory store")]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service.
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// List articles, optionally filtered by a query.
    Articles {
        query: Option<String>,
        #[arg(long)]
        no_images: bool,
    },
    /// Search as you type: each stdin line is a keystroke, `:enter` submits
    /// and `:esc` clears.
    Search,
    /// Compose a newspaper from the given article ids. Put `--` before ids
    /// that start with a dash.
    Newspaper {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long, help = "Write the issue here instead of stdout")]
        out: Option<PathBuf>,
        #[arg(long, help = "Emit the print view")]
        print: bool,
    },
    /// List rubric entries.
    Rubrics {
        #[arg(long = "type")]
        rubric_type: Option<String>,
    },
    /// Upcoming events (or all of them with --all).
    Events {
        #[arg(long)]
        all: bool,
    },
    /// Rubric statistics.
    Stats,
}

impl Cli {
    /// Environment first, flags on top.
    fn site_config(&self) -> Result<SiteConfig> {
        let mut config = SiteConfig::from_env()?;
        let overrides = [
            (&mut config.store_url, &self.store_url),
            (&mut config.store_auth, &self.store_auth),
            (&mut config.model_url, &self.model_url),
            (&mut config.api_key, &self.api_key),
        ];
        for (slot, flag) in overrides {
            if flag.is_some() {
                slot.clone_from(flag);
            }
        }
        if let Some(storage) = &self.storage {
            config.storage = storage.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config.ai_composition_enabled |= self.ai;
        config.validate()?;
        Ok(config)
    }
}

async fn open_store(config: &SiteConfig, seed: Option<&PathBuf>) -> Result<Arc<dyn DocumentStore>> {
    match seed {
        Some(path) if config.storage == "memory" => {
            let export: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(path).await?)?;
            let store = InMemoryStore::from_export(export)?;
            info!("💾 Document store ready (using memory, seeded from {})", path.display());
            Ok(Arc::new(store))
        }
        Some(path) => Err(Error::validation(format!(
            "--seed {} only applies to the memory store",
            path.display()
        ))),
        None => {
            mj_storage::create_storage(&config.storage, config.store_url.as_deref(), config.store_auth.as_deref())
                .await
        }
    }
}

/// The generator is optional: without one every issue uses the basic layout.
async fn open_generator(config: &SiteConfig) -> Option<Arc<dyn TextGenerator>> {
    if !config.ai_composition_enabled {
        return None;
    }
    match mj_inference::create_model(Some(mj_inference::Config::from(config))).await {
        Ok(model) => {
            info!("🧠 Text generator initialized successfully (using {})", model.name());
            Some(model)
        }
        Err(e) => {
            warn!("⚠️ Text generator unavailable, newspapers use the basic layout: {}", e);
            None
        }
    }
}

fn print_outcome(outcome: &SearchOutcome, caption: &str) {
    println!("{}", caption);
    for article in &outcome.articles {
        println!(
            "{:<12} {:<24} {} ({})",
            format_date(&article.date),
            article.id,
            article.title,
            article.author
        );
    }
}

async fn interactive_search(site: &mut SiteState, config: &SiteConfig) -> Result<()> {
    let mut search = DebouncedSearch::spawn(config.search_debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Въведете заявка (:enter търси веднага, :esc изчиства, Ctrl-D изход)");
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match line.trim() {
                    ":enter" => search.enter(),
                    ":esc" => search.escape(),
                    _ => search.keystroke(line),
                },
                None => break,
            },
            Some(query) = search.next_query() => {
                site.apply_query(&query);
                print_outcome(site.outcome(), site.list_view.caption());
            }
        }
    }
    Ok(())
}

async fn compose_newspaper(
    site: &mut SiteState,
    ids: &[String],
    composition: Composition,
    out: Option<&PathBuf>,
    print: bool,
) -> Result<()> {
    for id in ids {
        if site.catalog.find(id).is_none() {
            warn!(article_id = %id, "⚠️ Unknown article, skipping");
        }
        site.selection.toggle(id, true);
    }
    let newspaper = site
        .newspaper
        .build(&site.catalog, &site.selection, composition, Utc::now())
        .await?
        .clone();
    if let Some(reason) = &newspaper.fallback_reason {
        warn!("⚠️ Composed with the basic layout after a generator failure: {}", reason);
    }
    let file = download(&newspaper);
    let body = if print { print_view(&newspaper) } else { file.body };
    match out {
        Some(path) => {
            tokio::fs::write(path, body).await?;
            info!(
                "🗞️ Newspaper written to {} ({} articles, suggested name {})",
                path.display(),
                newspaper.stats.article_count,
                file.filename
            );
        }
        None => println!("{}", body),
    }
    Ok(())
}

async fn list_rubrics(store: Arc<dyn DocumentStore>, raw_type: Option<&str>) -> Result<()> {
    let rubrics = RubricService::new(store);
    let (entries, total) = match raw_type {
        Some(raw) => {
            let page = rubrics.by_type(raw.parse::<RubricType>()?, BY_TYPE_LIMIT).await?;
            (page.rubrics, page.total)
        }
        None => {
            let all = rubrics.all(ALL_LIMIT).await?;
            let total = all.len();
            (all, total)
        }
    };
    println!("Общо: {}", total);
    for rubric in entries {
        println!(
            "{} {:<12} {} ({})",
            rubric.rubric_type.info().icon,
            format_date(&rubric.date),
            rubric.title,
            rubric.author
        );
    }
    Ok(())
}

async fn list_events(store: Arc<dyn DocumentStore>, all: bool) -> Result<()> {
    let events = EventService::new(store);
    let now = Utc::now();
    let list = if all { events.all().await? } else { events.upcoming(now).await? };
    if list.is_empty() {
        println!("Няма предстоящи събития");
    }
    for event in list {
        let when = event.starts_at().map(|at| format_date_time(&at)).unwrap_or_default();
        println!("{} | {} | {}", when, event.title, event.location);
    }
    Ok(())
}

async fn print_stats(store: Arc<dyn DocumentStore>) -> Result<()> {
    let stats = RubricService::new(store).statistics(Utc::now()).await?;
    println!("Общо рубрики: {}", stats.total);
    for rubric_type in RubricType::ALL {
        let info = rubric_type.info();
        println!(
            "{} {}: {} ({}%)",
            info.icon,
            info.name,
            stats.count(rubric_type),
            stats.percentage(rubric_type)
        );
    }
    println!("През последната седмица: {}", stats.last_week);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let config = cli.site_config()?;

    let store = open_store(&config, cli.seed.as_ref()).await?;
    let generator = open_generator(&config).await;

    match cli.command {
        Commands::Serve { port } => {
            let state = mj_web::AppState::new(store, generator, config);
            if let Err(e) = state.load().await {
                warn!("⚠️ Starting without articles: {}", e);
            }
            mj_web::serve(state, port).await?;
        }
        Commands::Articles { query, no_images } => {
            let mut site = SiteState::new(&config, Composer::new(generator, config.ai_composition_enabled));
            site.load(store.as_ref()).await?;
            site.set_show_images(!no_images);
            site.apply_query(query.as_deref().unwrap_or_default());
            print_outcome(site.outcome(), site.list_view.caption());
        }
        Commands::Search => {
            let mut site = SiteState::new(&config, Composer::new(generator, config.ai_composition_enabled));
            site.load(store.as_ref()).await?;
            interactive_search(&mut site, &config).await?;
        }
        Commands::Newspaper { ids, out, print } => {
            let composition = if config.ai_composition_enabled {
                Composition::Ai
            } else {
                Composition::Basic
            };
            let mut site = SiteState::new(&config, Composer::new(generator, config.ai_composition_enabled));
            site.load(store.as_ref()).await?;
            compose_newspaper(&mut site, &ids, composition, out.as_ref(), print).await?;
        }
        Commands::Rubrics { rubric_type } => list_rubrics(store, rubric_type.as_deref()).await?,
        Commands::Events { all } => list_events(store, all).await?,
        Commands::Stats => print_stats(store).await?,
    }

    Ok(())
}
