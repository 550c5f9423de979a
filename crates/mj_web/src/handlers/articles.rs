use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use mj_core::{Article, Error};
use mj_site::catalog::ARTICLE_NOT_FOUND;
use mj_site::crud::articles::{ARTICLE_DELETED, ARTICLE_PUBLISHED, ARTICLE_UPDATED};
use mj_site::crud::{ArticleDraft, ArticleUpdate};
use mj_site::render::articles::{render_article_error, render_article_page, render_suggestions};
use mj_site::render::Message;
use mj_site::{load_one, SearchOutcome, SelectionControls, SiteState, Suggestion};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::reported;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const LOAD_ARTICLE_FAILED: &str = "Грешка при зареждане на статията";
const SAVE_ARTICLE_FAILED: &str = "Грешка при запазване на статията";
const DELETE_ARTICLE_FAILED: &str = "Грешка при изтриване на статията";
const NOT_ON_SCREEN: &str = "Статията не е в показания списък";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    pub images: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    pub caption: String,
    pub html: String,
    pub controls: SelectionControls,
}

impl ArticleListResponse {
    fn of(site: &SiteState) -> Self {
        Self {
            outcome: site.outcome().clone(),
            caption: site.list_view.caption().to_string(),
            html: site.list_view.markup().to_string(),
            controls: site.list_view.controls(),
        }
    }
}

/// Run a search and re-render the grid. An empty `q` shows the newest articles.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<ArticleListResponse> {
    let mut site = state.site.write().await;
    if let Some(images) = query.images {
        site.set_show_images(images);
    }
    site.apply_query(&query.q);
    Json(ArticleListResponse::of(&site))
}

pub async fn reload_articles(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let mut site = state.site.write().await;
    match site.load(state.store.as_ref()).await {
        Ok(count) => Ok(Json(json!({ "count": count }))),
        Err(e) => Err(match site.panels.panels().last() {
            Some(panel) => ApiError::Reported(panel.clone()),
            None => ApiError::Site(e),
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
    pub html: String,
}

pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<SuggestionsResponse> {
    let site = state.site.read().await;
    let suggestions = site.suggestions(&query.q);
    let html = render_suggestions(&suggestions, &query.q);
    Json(SuggestionsResponse { suggestions, html })
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Article>> {
    match load_one(state.store.as_ref(), &id).await {
        Ok(article) => Ok(Json(article)),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, LOAD_ARTICLE_FAILED, e))
        }
    }
}

/// The single-article page, or an inline error in its place.
pub async fn article_page(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
    match load_one(state.store.as_ref(), &id).await {
        Ok(article) => (StatusCode::OK, Html(render_article_page(&article))),
        Err(Error::NotFound(_)) => (StatusCode::NOT_FOUND, Html(render_article_error(ARTICLE_NOT_FOUND))),
        Err(e) => {
            tracing::warn!(article_id = %id, error = %e, "article page failed");
            (StatusCode::BAD_GATEWAY, Html(render_article_error(LOAD_ARTICLE_FAILED)))
        }
    }
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ArticleDraft>,
) -> ApiResult<impl IntoResponse> {
    let mut site = state.site.write().await;
    match state.articles.create(&mut site.catalog, draft, Utc::now()).await {
        Ok(id) => {
            site.refresh();
            Ok((
                StatusCode::CREATED,
                Json(json!({ "id": id, "message": Message::success(ARTICLE_PUBLISHED) })),
            ))
        }
        Err(e) => Err(reported(&mut site, SAVE_ARTICLE_FAILED, e)),
    }
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<ArticleUpdate>,
) -> ApiResult<Json<Message>> {
    let mut site = state.site.write().await;
    match state.articles.update(&mut site.catalog, &id, update).await {
        Ok(()) => {
            site.refresh();
            Ok(Json(Message::success(ARTICLE_UPDATED)))
        }
        Err(e) => Err(reported(&mut site, SAVE_ARTICLE_FAILED, e)),
    }
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    let mut site = state.site.write().await;
    match state.articles.delete(&mut site.catalog, &id).await {
        Ok(()) => {
            site.refresh();
            Ok(Json(Message::success(ARTICLE_DELETED)))
        }
        Err(e) => Err(reported(&mut site, DELETE_ARTICLE_FAILED, e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub checked: bool,
}

/// A checkbox change on a rendered card.
pub async fn toggle_selection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<SelectionControls>> {
    let mut site = state.site.write().await;
    let controls = site
        .toggle(&id, request.checked)
        .ok_or_else(|| Error::NotFound(NOT_ON_SCREEN.to_string()))?;
    info!(article_id = %id, selected = controls.count, "selection changed");
    Ok(Json(controls))
}

pub async fn clear_selection(State(state): State<Arc<AppState>>) -> Json<SelectionControls> {
    let mut site = state.site.write().await;
    Json(site.clear_selection())
}
