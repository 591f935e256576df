use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde::Deserialize;

use headline_common::{HeadlinePatch, HeadlineRecord, PageRequest, DEFAULT_PAGE_LIMIT};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

// --- Request structs ---

#[derive(Deserialize)]
pub struct ClassifyRequest {
    text: String,
}

#[derive(Deserialize)]
pub struct HeadlinesQuery {
    skip: Option<i64>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateQuery {
    category: Option<String>,
    score: Option<f64>,
}

// --- Handlers ---

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "active" }))
}

/// Classify a new headline and store the result.
pub async fn classify_headline(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ClassifyRequest>,
) -> Result<Json<HeadlineRecord>, ApiError> {
    let record = state.archive.classify_and_insert(&body.text).await?;
    Ok(Json(record))
}

pub async fn list_headlines(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<HeadlinesQuery>,
) -> Result<Json<Vec<HeadlineRecord>>, ApiError> {
    let page = PageRequest::new(
        params.skip.unwrap_or(0),
        params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    )?;
    Ok(Json(state.archive.list_page(page).await?))
}

/// Manual override of category and/or score.
pub async fn update_headline(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<UpdateQuery>,
) -> Result<Json<HeadlineRecord>, ApiError> {
    let patch = HeadlinePatch {
        category: params.category,
        score: params.score,
    };
    Ok(Json(state.archive.update_partial(id, patch).await?))
}

pub async fn delete_headline(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.archive.delete(id).await?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Headline deleted",
        "deleted_id": id,
    })))
}
