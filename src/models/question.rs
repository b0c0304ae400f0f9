// src/models/question.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database (true/false questions).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// The statement the user judges true or false.
    pub question: String,

    /// The correct answer.
    pub answer: bool,

    /// Explanation shown after answering.
    pub explanation: Option<String>,

    /// Longer AI-generated explanation, if one was produced.
    pub ai_explanation: Option<String>,

    /// Source references (label -> citation). Stored as JSON; the column is
    /// named `refs` since `references` is reserved in SQL.
    #[sqlx(rename = "refs")]
    #[serde(rename = "references")]
    pub references: Option<Json<HashMap<String, String>>>,

    pub category: String,
    pub subcategory: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    pub answer: bool,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
    #[validate(length(max = 4000))]
    pub ai_explanation: Option<String>,
    pub references: Option<HashMap<String, String>>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub subcategory: Option<String>,
}
