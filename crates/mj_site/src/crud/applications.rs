use chrono::{DateTime, Utc};
use mj_core::types::APPLICATION_STATUS_NEW;
use mj_core::{Application, Collection, DocumentStore, Error, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::require;

pub const APPLICATION_SENT: &str = "Кандидатстването е изпратено успешно! Ще се свържем с теб скоро.";
pub const APPLICATION_FAILED: &str = "Възникна грешка. Моля, опитай отново или ни изпрати имейл директно.";
pub const INVALID_EMAIL: &str = "Моля, въведете валиден имейл адрес";

/// The membership form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationForm {
    pub name: String,
    pub email: String,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn DocumentStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, form: ApplicationForm, now: DateTime<Utc>) -> Result<Application> {
        require(&[&form.name, &form.email, &form.class_name])?;
        let email = form.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(Error::validation(INVALID_EMAIL));
        }

        let mut application = Application {
            id: String::new(),
            name: form.name.trim().to_string(),
            email: email.to_string(),
            class_name: form.class_name.trim().to_string(),
            message: form.message.trim().to_string(),
            timestamp: now.to_rfc3339(),
            status: APPLICATION_STATUS_NEW.to_string(),
        };
        application.id = self
            .store
            .push(Collection::Applications, serde_json::to_value(&application)?)
            .await?;
        info!(application_id = %application.id, "📨 Membership application from {}", application.name);
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::FailingStore;
    use crate::crud::REQUIRED_FIELDS;
    use mj_storage::InMemoryStore;

    fn form(name: &str, email: &str) -> ApplicationForm {
        ApplicationForm {
            name: name.to_string(),
            email: email.to_string(),
            class_name: "9а".to_string(),
            message: "Искам да пиша за спорт".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_stores_new_application() {
        let store = Arc::new(InMemoryStore::new());
        let service = ApplicationService::new(store.clone());
        let application = service.submit(form("Ники", " niki@school.bg "), Utc::now()).await.unwrap();
        assert_eq!(application.status, "new");
        assert_eq!(application.email, "niki@school.bg");

        let stored = store
            .fetch_one(Collection::Applications, &application.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["class"], "9а");
        assert_eq!(stored["status"], "new");
    }

    #[tokio::test]
    async fn test_submit_validates_first() {
        let service = ApplicationService::new(Arc::new(FailingStore));
        let err = service.submit(form("", "a@b.bg"), Utc::now()).await.unwrap_err();
        assert_eq!(err.to_string(), REQUIRED_FIELDS);
        let err = service.submit(form("Ники", "niki"), Utc::now()).await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_EMAIL);
    }
}
