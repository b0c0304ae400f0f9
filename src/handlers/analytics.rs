// src/handlers/analytics.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{error::AppError, services::analytics, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub user_id: Option<i64>,
    pub time_range: Option<String>,
    pub category: Option<String>,
}

/// Computes the analytics bundle for one user over the requested window.
pub async fn user_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;
    let time_range = params.time_range.as_deref().unwrap_or("30days");
    let category = params.category.as_deref().unwrap_or("all");

    let view =
        analytics::get_user_analytics(state.storage.as_ref(), user_id, time_range, category)
            .await?;

    Ok(Json(view))
}

/// Distinct category list derived from the question store.
pub async fn categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = analytics::get_categories(state.storage.as_ref()).await?;
    Ok(Json(categories))
}
