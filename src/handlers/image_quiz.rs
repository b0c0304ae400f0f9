// src/handlers/image_quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError, handlers::quiz::RandomParams,
    models::quiz_attempt::RecordImageAnswerRequest, services::quiz, state::AppState,
};

/// Static category/subcategory taxonomy for image quizzes.
pub async fn get_categories() -> impl IntoResponse {
    Json(quiz::image_quiz_categories())
}

/// Picks one random image question matching the optional filters.
pub async fn random_question(
    State(state): State<AppState>,
    Query(params): Query<RandomParams>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .storage
        .get_random_image_question(params.category.as_deref(), params.subcategory.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No image questions found for the specified criteria".to_string())
        })?;

    Ok(Json(question))
}

/// Records an answered image question and returns the updated stats.
pub async fn record_answer(
    State(state): State<AppState>,
    Json(payload): Json<RecordImageAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let stats =
        quiz::record_image_answer(state.storage.as_ref(), state.profiles.as_ref(), payload)
            .await?;

    Ok(Json(stats))
}
