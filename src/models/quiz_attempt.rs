// src/models/quiz_attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_attempts' table: one row per answered question.
/// Append-only; rows are never mutated or deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,

    /// Exactly one of `question_id` / `image_question_id` is set.
    pub question_id: Option<i64>,
    pub image_question_id: Option<i64>,

    pub user_answer: String,
    pub is_correct: bool,

    pub category: String,
    pub subcategory: Option<String>,

    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a new attempt row.
#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub user_id: i64,
    pub question_id: Option<i64>,
    pub image_question_id: Option<i64>,
    pub user_answer: String,
    pub is_correct: bool,
    pub category: String,
    pub subcategory: Option<String>,
}

/// DTO for recording a true/false answer.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswerRequest {
    pub question_id: i64,
    pub is_correct: bool,
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub subcategory: Option<String>,
}

/// DTO for recording an image-quiz answer. The question id arrives as a
/// string and the subcategory is mandatory.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordImageAnswerRequest {
    #[validate(length(min = 1, message = "Question ID is required"))]
    pub question_id: String,
    pub is_correct: bool,
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Subcategory is required"))]
    pub subcategory: String,
}
