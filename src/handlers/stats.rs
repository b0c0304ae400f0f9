// src/handlers/stats.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{error::AppError, services::quiz, state::AppState};

/// Current aggregate counters for one user, read from the profile store.
pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stats = quiz::get_user_stats(state.profiles.as_ref(), &user_id).await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// Leaderboard over every profile, optionally scoped to a category or a
/// category/subcategory pair. No pagination; truncation is the client's call.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let entries = quiz::get_leaderboard(
        state.profiles.as_ref(),
        params.category.as_deref(),
        params.subcategory.as_deref(),
    )
    .await?;

    Ok(Json(entries))
}
