use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use mj_core::Event;
use mj_site::crud::events::EVENT_DELETED;
use mj_site::crud::EventDraft;
use mj_site::render::{render_admin_events, render_timeline, Message};
use serde::Serialize;
use std::sync::Arc;

use super::reported;
use crate::error::ApiResult;
use crate::AppState;

const LOAD_EVENTS_FAILED: &str = "Грешка при зареждане на събитията";
const SAVE_EVENT_FAILED: &str = "Грешка при запазване на събитието";
const DELETE_EVENT_FAILED: &str = "Грешка при изтриване на събитието";

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
    pub html: String,
}

/// Admin list: every event, past ones included.
pub async fn list_events(State(state): State<Arc<AppState>>) -> ApiResult<Json<EventListResponse>> {
    let now = Utc::now();
    match state.events.all().await {
        Ok(events) => Ok(Json(EventListResponse {
            html: render_admin_events(&events, now),
            events,
        })),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, LOAD_EVENTS_FAILED, e))
        }
    }
}

/// Public timeline of what is still ahead.
pub async fn upcoming_events(State(state): State<Arc<AppState>>) -> ApiResult<Json<EventListResponse>> {
    let now = Utc::now();
    match state.events.upcoming(now).await {
        Ok(events) => Ok(Json(EventListResponse {
            html: render_timeline(&events, now),
            events,
        })),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, LOAD_EVENTS_FAILED, e))
        }
    }
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<EventDraft>,
) -> ApiResult<impl IntoResponse> {
    match state.events.create(draft, Utc::now()).await {
        Ok(event) => Ok((StatusCode::CREATED, Json(event))),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, SAVE_EVENT_FAILED, e))
        }
    }
}

pub async fn delete_event(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<Message>> {
    match state.events.delete(&id).await {
        Ok(()) => Ok(Json(Message::success(EVENT_DELETED))),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, DELETE_EVENT_FAILED, e))
        }
    }
}
