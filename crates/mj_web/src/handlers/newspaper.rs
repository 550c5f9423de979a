use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use mj_core::{Error, Result};
use mj_site::newspaper::export::render_manual_copy;
use mj_site::newspaper::{
    download, print_view, share, Newspaper, ShareOutcome, SharePayload, ShareTarget, SUPERSEDED,
};
use mj_site::{Composition, Phase};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::AppState;

const NO_NEWSPAPER: &str = "Все още няма генериран вестник";

#[derive(Debug, Default, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub composition: Composition,
}

/// Compose an issue from the current selection. The site lock is released
/// while the generator works, so other requests keep being served.
pub async fn build_newspaper(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BuildRequest>,
) -> ApiResult<Json<Newspaper>> {
    let (job, composer) = {
        let mut guard = state.site.write().await;
        let site = &mut *guard;
        let job = site
            .newspaper
            .begin(&site.catalog, &site.selection, request.composition, Utc::now())?;
        (job, site.newspaper.composer().clone())
    };
    let generation = job.generation();
    let newspaper = job.run(&composer).await;
    let mut site = state.site.write().await;
    site.newspaper
        .finish(generation, newspaper)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::validation(SUPERSEDED).into())
}

#[derive(Debug, Serialize)]
pub struct NewspaperStatus {
    pub phase: Phase,
    pub history: Vec<Phase>,
    pub ai_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading: Option<String>,
    pub newspaper: Option<Newspaper>,
}

pub async fn newspaper_status(State(state): State<Arc<AppState>>) -> Json<NewspaperStatus> {
    let site = state.site.read().await;
    let builder = &site.newspaper;
    Json(NewspaperStatus {
        phase: builder.phase(),
        history: builder.history().to_vec(),
        ai_enabled: builder.composer().ai_enabled(),
        loading: builder.loading_placeholder(),
        newspaper: builder.document().cloned(),
    })
}

pub async fn reset_newspaper(State(state): State<Arc<AppState>>) -> StatusCode {
    state.site.write().await.newspaper.reset();
    StatusCode::NO_CONTENT
}

async fn current(state: &AppState) -> Result<Newspaper> {
    let site = state.site.read().await;
    site.newspaper
        .document()
        .cloned()
        .ok_or_else(|| Error::NotFound(NO_NEWSPAPER.to_string()))
}

pub async fn print_newspaper(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let newspaper = current(&state).await?;
    Ok(Html(print_view(&newspaper)))
}

pub async fn download_newspaper(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let file = download(&current(&state).await?);
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ShareQuery {
    /// Whether the caller has a native share sheet to hand the payload to.
    #[serde(default)]
    pub native: bool,
}

/// Hands the payload back to a caller that can open its own share sheet.
struct CallerShareSheet;

impl ShareTarget for CallerShareSheet {
    fn share(&self, _payload: &SharePayload) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub outcome: ShareOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

pub async fn share_newspaper(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShareQuery>,
) -> ApiResult<Json<ShareResponse>> {
    let newspaper = current(&state).await?;
    let target = query.native.then_some(&CallerShareSheet as &dyn ShareTarget);
    let outcome = share(&newspaper, &state.config.site_url, target);
    let html = match &outcome {
        ShareOutcome::ManualCopy { text } => Some(render_manual_copy(text)),
        ShareOutcome::Shared(_) => None,
    };
    Ok(Json(ShareResponse { outcome, html }))
}
