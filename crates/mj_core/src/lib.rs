pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use config::SiteConfig;
pub use error::{Error, ErrorKind};
pub use models::TextGenerator;
pub use storage::{is_valid_key, Collection, Document, DocumentStore};
pub use types::{
    Application, Article, ArticleRecord, Category, Event, EventProximity, Rubric, RubricType,
    RubricTypeInfo,
};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::storage::{Collection, DocumentStore};
    pub use crate::types::*;
    pub use crate::{Error, Result, TextGenerator};
}
