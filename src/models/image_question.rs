// src/models/image_question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'image_questions' table (multiple-choice image recognition).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageQuestion {
    pub id: i64,

    pub image_url: String,

    /// The prompt shown alongside the image.
    pub question: String,

    /// Answer options. Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    pub correct_answer: String,

    pub explanation: Option<String>,

    pub category: String,
    pub subcategory: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new image question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub image_url: String,
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub subcategory: String,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
