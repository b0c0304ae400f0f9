// src/models/user.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

/// Per-topic counters, keyed by `"<category>"` or `"<category>/<subcategory>"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub attempts: i64,
    pub correct: i64,
}

/// Represents the 'users' table in the database.
///
/// The aggregate counters mirror the profile document held in the external
/// document store; the two copies are updated independently.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    pub username: String,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    pub total_attempts: i64,
    pub correct_answers: i64,

    /// Consecutive correct answers ending at the most recent attempt.
    pub streak: i64,
    /// Historical maximum of `streak`.
    pub max_streak: i64,

    /// Local calendar date of the last recorded answer, YYYY-MM-DD.
    pub last_quiz_date: Option<String>,

    pub category_stats: Json<HashMap<String, CategoryStat>>,

    /// Key of this user's document in the external profile store.
    pub firebase_id: Option<String>,
}

/// Per-user document in the external profile store.
///
/// All counter fields default to zero when absent, matching how the
/// document store returns partially-populated documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub total_attempts: i64,
    #[serde(default)]
    pub correct_answers: i64,
    #[serde(default)]
    pub streak: i64,
    #[serde(default)]
    pub max_streak: i64,
    #[serde(default)]
    pub last_quiz_date: Option<String>,
    #[serde(default)]
    pub category_stats: HashMap<String, CategoryStat>,
}

/// Aggregate counters as read from (and written back to) either store.
/// Also the response body of the record-answer and user-stats endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_attempts: i64,
    pub correct_answers: i64,
    pub streak: i64,
    pub max_streak: i64,
    pub last_quiz_date: Option<String>,
    pub category_stats: HashMap<String, CategoryStat>,
}

impl ProfileDocument {
    pub fn stats(&self) -> UserStats {
        UserStats {
            total_attempts: self.total_attempts,
            correct_answers: self.correct_answers,
            streak: self.streak,
            max_streak: self.max_streak,
            last_quiz_date: self.last_quiz_date.clone(),
            category_stats: self.category_stats.clone(),
        }
    }

    /// Copies updated counters back into the document, leaving identity
    /// fields untouched.
    pub fn apply(&mut self, stats: &UserStats) {
        self.total_attempts = stats.total_attempts;
        self.correct_answers = stats.correct_answers;
        self.streak = stats.streak;
        self.max_streak = stats.max_streak;
        self.last_quiz_date = stats.last_quiz_date.clone();
        self.category_stats = stats.category_stats.clone();
    }
}

impl From<&User> for UserStats {
    fn from(user: &User) -> Self {
        UserStats {
            total_attempts: user.total_attempts,
            correct_answers: user.correct_answers,
            streak: user.streak,
            max_streak: user.max_streak,
            last_quiz_date: user.last_quiz_date.clone(),
            category_stats: user.category_stats.0.clone(),
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub accuracy: f64,
    pub attempts: i64,
    pub correct: i64,
    pub streak: i64,
}

/// DTO for creating a new user in both stores.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    /// External identity-provider id; doubles as the profile document key.
    pub firebase_id: Option<String>,
}
