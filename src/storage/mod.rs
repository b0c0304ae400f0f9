// src/storage/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::image_question::{CreateImageQuestionRequest, ImageQuestion};
use crate::models::question::{CreateQuestionRequest, Question};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::models::user::{CreateUserRequest, User, UserStats};

pub use memory::MemStorage;
pub use postgres::PgStorage;

/// Relational persistence seam: question banks, users, and the append-only
/// attempt log. Implemented by [`PgStorage`] in production and [`MemStorage`]
/// for tests.
#[async_trait]
pub trait Storage: Send + Sync {
    // User management
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError>;
    async fn create_user(&self, user: CreateUserRequest) -> Result<User, AppError>;
    async fn update_user_stats(&self, user_id: i64, stats: &UserStats) -> Result<(), AppError>;

    // Question bank
    async fn get_questions_by_category(
        &self,
        category: &str,
        subcategory: Option<&str>,
    ) -> Result<Vec<Question>, AppError>;
    async fn get_random_question(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> Result<Option<Question>, AppError>;
    async fn create_question(&self, question: CreateQuestionRequest) -> Result<Question, AppError>;
    async fn distinct_categories(&self) -> Result<Vec<String>, AppError>;

    // Image questions
    async fn get_random_image_question(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> Result<Option<ImageQuestion>, AppError>;
    async fn create_image_question(
        &self,
        question: CreateImageQuestionRequest,
    ) -> Result<ImageQuestion, AppError>;

    // Attempt log
    async fn record_quiz_attempt(&self, attempt: NewQuizAttempt)
    -> Result<QuizAttempt, AppError>;
    async fn get_user_quiz_attempts(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError>;
}
