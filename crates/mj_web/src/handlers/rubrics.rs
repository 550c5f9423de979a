use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use mj_core::{Article, Rubric, RubricType};
use mj_site::crud::rubrics::{ALL_LIMIT, BY_TYPE_LIMIT, RECENT_LIMIT, RUBRIC_DELETED};
use mj_site::crud::{RubricDraft, RubricStatistics, RubricUpdate};
use mj_site::render::{render_rubric_list, render_rubric_statistics, render_rubric_type_cards, Message};
use mj_site::RubricBrowser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::reported;
use crate::error::ApiResult;
use crate::AppState;

const LOAD_RUBRICS_FAILED: &str = "Грешка при зареждане на рубриките";
const SAVE_RUBRIC_FAILED: &str = "Грешка при запазване на рубриката";
const DELETE_RUBRIC_FAILED: &str = "Грешка при изтриване на рубриката";

#[derive(Debug, Default, Deserialize)]
pub struct RubricQuery {
    #[serde(rename = "type")]
    pub rubric_type: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RubricListResponse {
    pub rubrics: Vec<Rubric>,
    pub total: usize,
    pub html: String,
}

pub async fn list_rubrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RubricQuery>,
) -> ApiResult<Json<RubricListResponse>> {
    let filter = match query.rubric_type.as_deref().filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => Some(raw.parse::<RubricType>()?),
        None => None,
    };
    let result = match filter {
        Some(rubric_type) => state
            .rubrics
            .by_type(rubric_type, query.limit.unwrap_or(BY_TYPE_LIMIT))
            .await
            .map(|page| (page.rubrics, page.total)),
        None => state
            .rubrics
            .all(query.limit.unwrap_or(ALL_LIMIT))
            .await
            .map(|rubrics| {
                let total = rubrics.len();
                (rubrics, total)
            }),
    };
    match result {
        Ok((rubrics, total)) => Ok(Json(RubricListResponse {
            html: render_rubric_list(&rubrics, filter),
            rubrics,
            total,
        })),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, LOAD_RUBRICS_FAILED, e))
        }
    }
}

pub async fn recent_rubrics(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Rubric>>> {
    match state.rubrics.recent(RECENT_LIMIT).await {
        Ok(rubrics) => Ok(Json(rubrics)),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, LOAD_RUBRICS_FAILED, e))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub stats: RubricStatistics,
    pub html: String,
}

pub async fn rubric_statistics(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatisticsResponse>> {
    match state.rubrics.statistics(Utc::now()).await {
        Ok(stats) => Ok(Json(StatisticsResponse {
            html: render_rubric_statistics(&stats),
            stats,
        })),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, LOAD_RUBRICS_FAILED, e))
        }
    }
}

pub async fn create_rubric(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<RubricDraft>,
) -> ApiResult<impl IntoResponse> {
    match state.rubrics.create(draft, Utc::now()).await {
        Ok(rubric) => Ok((StatusCode::CREATED, Json(rubric))),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, SAVE_RUBRIC_FAILED, e))
        }
    }
}

pub async fn update_rubric(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<RubricUpdate>,
) -> ApiResult<Json<Message>> {
    match state.rubrics.update(&id, update).await {
        Ok(()) => Ok(Json(Message::success("Рубриката е обновена успешно!"))),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, SAVE_RUBRIC_FAILED, e))
        }
    }
}

pub async fn delete_rubric(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<Message>> {
    match state.rubrics.delete(&id).await {
        Ok(()) => Ok(Json(Message::success(RUBRIC_DELETED))),
        Err(e) => {
            let mut site = state.site.write().await;
            Err(reported(&mut site, DELETE_RUBRIC_FAILED, e))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RubricCount {
    #[serde(rename = "type")]
    pub rubric_type: RubricType,
    pub name: &'static str,
    pub icon: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RubricTypesResponse {
    pub types: Vec<RubricCount>,
    pub html: String,
}

/// Article counts per rubric type, from the loaded catalog.
pub async fn rubric_types(State(state): State<Arc<AppState>>) -> Json<RubricTypesResponse> {
    let site = state.site.read().await;
    let counts = RubricBrowser::counts(&site.catalog);
    Json(RubricTypesResponse {
        html: render_rubric_type_cards(&counts),
        types: counts
            .into_iter()
            .map(|(rubric_type, count)| {
                let info = rubric_type.info();
                RubricCount {
                    rubric_type,
                    name: info.name,
                    icon: info.icon,
                    count,
                }
            })
            .collect(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricPageResponse {
    #[serde(rename = "type")]
    pub rubric_type: Option<RubricType>,
    pub articles: Vec<Article>,
    pub total: usize,
    pub has_more: bool,
    pub html: String,
}

fn browser_page(site: &mj_site::SiteState) -> RubricPageResponse {
    let browser = &site.browser;
    RubricPageResponse {
        rubric_type: browser.current(),
        articles: browser.visible().to_vec(),
        total: browser.total(),
        has_more: browser.has_more(),
        html: browser.render(&site.catalog),
    }
}

pub async fn open_rubric(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> ApiResult<Json<RubricPageResponse>> {
    let rubric_type: RubricType = raw.parse()?;
    let mut guard = state.site.write().await;
    let site = &mut *guard;
    site.browser.open(&site.catalog, rubric_type);
    Ok(Json(browser_page(site)))
}

pub async fn load_more_rubric(State(state): State<Arc<AppState>>) -> Json<RubricPageResponse> {
    let mut site = state.site.write().await;
    site.browser.load_more();
    Json(browser_page(&site))
}

pub async fn close_rubric(State(state): State<Arc<AppState>>) -> Json<RubricPageResponse> {
    let mut site = state.site.write().await;
    site.browser.back();
    Json(browser_page(&site))
}
