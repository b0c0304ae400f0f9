// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{image_question::CreateImageQuestionRequest, question::CreateQuestionRequest},
    state::AppState,
};

/// Creates a new true/false question.
/// Unauthenticated; gate behind an auth layer before exposing publicly.
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = state.storage.create_question(payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Creates a new image question.
pub async fn create_image_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateImageQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = state.storage.create_image_question(payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}
