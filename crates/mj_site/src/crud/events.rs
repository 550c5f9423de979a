use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use mj_core::{Collection, DocumentStore, Error, Event, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{decode_keyed, non_blank, require, require_id};

pub const INVALID_DATE_TIME: &str = "Невалидна дата или час";
pub const EVENT_ADDED: &str = "Събитието е добавено успешно!";
pub const EVENT_DELETED: &str = "Събитието е изтрито успешно!";

/// The admin form: a calendar date and a wall-clock time, both read as UTC.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub organizer: Option<String>,
}

fn event_timestamp(date: &str, time: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(INVALID_DATE_TIME))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|_| Error::validation(INVALID_DATE_TIME))?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)).timestamp_millis())
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn DocumentStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: EventDraft, now: DateTime<Utc>) -> Result<Event> {
        require(&[&draft.title, &draft.date, &draft.time, &draft.location])?;
        let timestamp = event_timestamp(&draft.date, &draft.time)?;

        let mut event = Event {
            id: String::new(),
            title: draft.title.trim().to_string(),
            description: non_blank(draft.description),
            location: draft.location.trim().to_string(),
            organizer: non_blank(draft.organizer),
            timestamp,
            created: now.timestamp_millis(),
        };
        event.id = self
            .store
            .push(Collection::Events, serde_json::to_value(&event)?)
            .await?;
        info!(event_id = %event.id, "📅 Event added: {}", event.title);
        Ok(event)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        require_id(id)?;
        self.store.remove(Collection::Events, id).await?;
        info!(event_id = %id, "🗑️ Event deleted");
        Ok(())
    }

    /// Every event, earliest first.
    pub async fn all(&self) -> Result<Vec<Event>> {
        let collection = Collection::Events;
        let documents = self.store.fetch_all(collection, Some(collection.order_field())).await?;
        let mut events: Vec<Event> = decode_keyed(documents, |event: &mut Event, key| event.id = key);
        events.sort_by_key(|event| event.timestamp);
        Ok(events)
    }

    pub async fn upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|event| event.is_upcoming(now))
            .collect())
    }
}
