//! Command handlers over the document store. Every handler validates its
//! input before touching the store.

use mj_core::{is_valid_key, Document, Error, Result};
use serde::de::DeserializeOwned;
use tracing::warn;

pub mod applications;
pub mod articles;
pub mod events;
pub mod rubrics;

pub use applications::{ApplicationForm, ApplicationService};
pub use articles::{ArticleDraft, ArticleService, ArticleUpdate};
pub use events::{EventDraft, EventService};
pub use rubrics::{RubricDraft, RubricPage, RubricService, RubricStatistics, RubricUpdate};

pub const REQUIRED_FIELDS: &str = "Моля, попълнете всички задължителни полета";
pub const MISSING_ID: &str = "Липсва идентификатор на записа";
pub const INVALID_ID: &str = "Невалиден идентификатор на записа";

/// Fails with [`REQUIRED_FIELDS`] when any value is blank.
pub(crate) fn require(values: &[&str]) -> Result<()> {
    if values.iter().any(|value| value.trim().is_empty()) {
        return Err(Error::validation(REQUIRED_FIELDS));
    }
    Ok(())
}

/// A record id must be non-blank and free of the characters the store
/// reserves for paths, so it always names one record of one collection.
pub(crate) fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::validation(MISSING_ID));
    }
    if !is_valid_key(id) {
        return Err(Error::validation(INVALID_ID));
    }
    Ok(())
}

/// Decode documents, stamping each with its key. Malformed records are
/// logged and skipped.
pub(crate) fn decode_keyed<T, F>(documents: Vec<Document>, mut set_id: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: FnMut(&mut T, String),
{
    documents
        .into_iter()
        .filter_map(|document| match document.decode::<T>() {
            Ok(mut value) => {
                set_id(&mut value, document.key);
                Some(value)
            }
            Err(e) => {
                warn!(key = %document.key, error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Drop `None` and blank strings from an optional text field.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require(&["а", "б"]).is_ok());
        let err = require(&["а", "  "]).unwrap_err();
        assert_eq!(err.to_string(), REQUIRED_FIELDS);
        assert_eq!(require_id(" ").unwrap_err().to_string(), MISSING_ID);
        assert!(require_id("-NxA1").is_ok());
        for id in ["../applications", "-a/imageUrl", "a.b", "#x", "$x", "x[1]"] {
            assert_eq!(require_id(id).unwrap_err().to_string(), INVALID_ID, "{}", id);
        }
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" x ".into())).as_deref(), Some("x"));
    }
}
