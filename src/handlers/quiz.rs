// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError, models::quiz_attempt::RecordAnswerRequest, services::quiz, state::AppState,
};

/// Static category/subcategory taxonomy for true/false quizzes.
pub async fn get_categories() -> impl IntoResponse {
    Json(quiz::quiz_categories())
}

#[derive(Debug, Deserialize)]
pub struct QuestionListParams {
    pub category: String,
    pub subcategory: Option<String>,
}

/// Lists the questions of one category, optionally narrowed to a subcategory.
pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let questions = state
        .storage
        .get_questions_by_category(&params.category, params.subcategory.as_deref())
        .await?;

    Ok(Json(questions))
}

#[derive(Debug, Deserialize)]
pub struct RandomParams {
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// Picks one random question matching the optional filters.
pub async fn random_question(
    State(state): State<AppState>,
    Query(params): Query<RandomParams>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .storage
        .get_random_question(params.category.as_deref(), params.subcategory.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No questions found for the specified criteria".to_string())
        })?;

    Ok(Json(question))
}

/// Records an answered question and returns the updated aggregate stats.
pub async fn record_answer(
    State(state): State<AppState>,
    Json(payload): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let stats =
        quiz::record_answer(state.storage.as_ref(), state.profiles.as_ref(), payload).await?;

    Ok(Json(stats))
}
