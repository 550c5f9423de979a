pub mod catalog;
pub mod crud;
pub mod debounce;
pub mod format;
pub mod newspaper;
pub mod render;
pub mod rubric_browser;
pub mod search;
pub mod selection;
pub mod state;

pub use catalog::{load_one, ArticleCatalog};
pub use debounce::{DebouncedSearch, Debouncer, SearchInput};
pub use newspaper::{Composer, Composition, Newspaper, NewspaperBuilder, Phase};
pub use rubric_browser::RubricBrowser;
pub use search::{search, suggestions, Highlighter, RenderMode, Scope, SearchOutcome, Suggestion};
pub use selection::{SelectionControls, SelectionSet};
pub use state::SiteState;

pub mod prelude {
    pub use crate::catalog::ArticleCatalog;
    pub use crate::crud::{ApplicationService, ArticleService, EventService, RubricService};
    pub use crate::newspaper::{Composer, Composition, NewspaperBuilder};
    pub use crate::selection::SelectionSet;
    pub use crate::state::SiteState;
    pub use mj_core::{Error, Result};
}
