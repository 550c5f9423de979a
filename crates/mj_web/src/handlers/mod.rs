use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use mj_core::{Error, ErrorKind};
use mj_site::crud::applications::{APPLICATION_FAILED, APPLICATION_SENT};
use mj_site::crud::ApplicationForm;
use mj_site::render::{ErrorPanel, Message};
use mj_site::SiteState;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub mod articles;
pub mod events;
pub mod newspaper;
pub mod rubrics;

pub use articles::*;
pub use events::*;
pub use newspaper::*;
pub use rubrics::*;

/// Transport failures become a dismissible panel; anything else is
/// answered directly.
pub(crate) fn reported(site: &mut SiteState, title: &str, error: Error) -> ApiError {
    match error.kind() {
        ErrorKind::Transport => ApiError::Reported(site.report(title, &error)),
        _ => ApiError::Site(error),
    }
}

pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ApplicationForm>,
) -> ApiResult<impl IntoResponse> {
    match state.applications.submit(form, chrono::Utc::now()).await {
        Ok(_) => Ok((StatusCode::CREATED, Json(Message::success(APPLICATION_SENT)))),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, APPLICATION_FAILED, e))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PanelsResponse {
    pub panels: Vec<ErrorPanel>,
    pub html: String,
}

pub async fn list_panels(State(state): State<Arc<AppState>>) -> Json<PanelsResponse> {
    let site = state.site.read().await;
    Json(PanelsResponse {
        panels: site.panels.panels().to_vec(),
        html: site.panels.render(),
    })
}

pub async fn dismiss_panel(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> StatusCode {
    let mut site = state.site.write().await;
    if site.panels.dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Minimal host page: the article grid plus any error panels.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let site = state.site.read().await;
    Html(format!(
        "<!DOCTYPE html><html lang=\"bg\"><head><meta charset=\"utf-8\"><title>{}</title></head><body>\
         <div id=\"errorPanels\">{}</div><p id=\"resultsInfo\">{}</p>\
         <div id=\"articlesContainer\">{}</div></body></html>",
        mj_site::newspaper::template::MASTHEAD,
        site.panels.render(),
        mj_site::format::escape(site.list_view.caption()),
        site.list_view.markup()
    ))
}
