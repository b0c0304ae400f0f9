// src/handlers/ai.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use validator::Validate;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,
}

/// Forwards a free-text medical question to the AI tutor. Always answers
/// 200 once validation passes; upstream failures arrive as the gateway's
/// canned message with `model: "error"`.
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let answer = state.tutor.ask(&payload.question).await;
    Ok(Json(answer))
}
