// src/handlers/users.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{CreateUserRequest, ProfileDocument},
    state::AppState,
};

/// Creates a user in both stores: the relational row plus a zeroed profile
/// document. The document key is the external identity id when provided,
/// otherwise the relational id.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = state.storage.create_user(payload).await?;

    let profile = ProfileDocument {
        display_name: user.display_name.clone(),
        email: user.email.clone(),
        ..ProfileDocument::default()
    };
    let document_key = user
        .firebase_id
        .clone()
        .unwrap_or_else(|| user.id.to_string());
    state
        .profiles
        .put_profile(&document_key, &profile)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}
