//! Axum route handlers for the job catalog and qualification lookups.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::client::CatalogSource;
use crate::catalog::fetcher::fetch_all_jobs;
use crate::catalog::models::{CatalogQuery, FetchSummary};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QualificationQuery {
    pub keyword: Option<String>,
}

/// GET /api/v1/jobs/search
///
/// Aggregates every page of matching jobs and returns them de-duplicated by code.
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<FetchSummary>, AppError> {
    let source: Arc<dyn CatalogSource> = state.catalog.clone();
    let summary = fetch_all_jobs(source, query, state.config.catalog_batch_size).await?;
    Ok(Json(summary))
}

/// GET /api/v1/jobs/:code
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Value>, AppError> {
    if code.trim().is_empty() {
        return Err(AppError::Validation("job code cannot be empty".to_string()));
    }
    Ok(Json(state.catalog.job_detail(code.trim()).await?))
}

/// GET /api/v1/jobs/themes
pub async fn handle_themes(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.catalog.themes().await?))
}

/// GET /api/v1/jobs/aptitudes
pub async fn handle_aptitudes(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.catalog.aptitudes().await?))
}

/// GET /api/v1/jobs/codes
pub async fn handle_job_codes(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.catalog.job_codes().await?))
}

/// GET /api/v1/qualifications
pub async fn handle_qualifications(
    State(state): State<AppState>,
    Query(query): Query<QualificationQuery>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(
        state.qualifications.list(query.keyword.as_deref()).await?,
    ))
}
