// src/storage/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::error::AppError;
use crate::models::image_question::{CreateImageQuestionRequest, ImageQuestion};
use crate::models::question::{CreateQuestionRequest, Question};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::models::user::{CreateUserRequest, User, UserStats};
use crate::storage::Storage;

const QUESTION_COLUMNS: &str =
    "id, question, answer, explanation, ai_explanation, refs, category, subcategory, created_at";

const IMAGE_QUESTION_COLUMNS: &str =
    "id, image_url, question, options, correct_answer, explanation, category, subcategory, created_at";

const USER_COLUMNS: &str = "id, username, email, display_name, email_verified, created_at, \
     total_attempts, correct_answers, streak, max_streak, last_quiz_date, category_stats, firebase_id";

/// PostgreSQL-backed storage.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE firebase_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: CreateUserRequest) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, display_name, firebase_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.firebase_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Postgres error code for unique violation is 23505
            if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
                AppError::Conflict(format!("User '{}' already exists", user.username))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(created)
    }

    async fn update_user_stats(&self, user_id: i64, stats: &UserStats) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users
             SET total_attempts = $1, correct_answers = $2, streak = $3,
                 max_streak = $4, last_quiz_date = $5, category_stats = $6
             WHERE id = $7",
        )
        .bind(stats.total_attempts)
        .bind(stats.correct_answers)
        .bind(stats.streak)
        .bind(stats.max_streak)
        .bind(&stats.last_quiz_date)
        .bind(Json(&stats.category_stats))
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    async fn get_questions_by_category(
        &self,
        category: &str,
        subcategory: Option<&str>,
    ) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE category = $1 AND ($2::TEXT IS NULL OR subcategory = $2)
             ORDER BY id"
        ))
        .bind(category)
        .bind(subcategory)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn get_random_question(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> Result<Option<Question>, AppError> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE ($1::TEXT IS NULL OR category = $1)
               AND ($2::TEXT IS NULL OR subcategory = $2)
             ORDER BY RANDOM()
             LIMIT 1"
        ))
        .bind(category)
        .bind(subcategory)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn create_question(&self, question: CreateQuestionRequest) -> Result<Question, AppError> {
        let created = sqlx::query_as::<_, Question>(&format!(
            "INSERT INTO questions (question, answer, explanation, ai_explanation, refs, category, subcategory)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(&question.question)
        .bind(question.answer)
        .bind(&question.explanation)
        .bind(&question.ai_explanation)
        .bind(question.references.as_ref().map(Json))
        .bind(&question.category)
        .bind(&question.subcategory)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(created)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, AppError> {
        let categories =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM questions ORDER BY category")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    async fn get_random_image_question(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> Result<Option<ImageQuestion>, AppError> {
        let question = sqlx::query_as::<_, ImageQuestion>(&format!(
            "SELECT {IMAGE_QUESTION_COLUMNS} FROM image_questions
             WHERE ($1::TEXT IS NULL OR category = $1)
               AND ($2::TEXT IS NULL OR subcategory = $2)
             ORDER BY RANDOM()
             LIMIT 1"
        ))
        .bind(category)
        .bind(subcategory)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn create_image_question(
        &self,
        question: CreateImageQuestionRequest,
    ) -> Result<ImageQuestion, AppError> {
        let created = sqlx::query_as::<_, ImageQuestion>(&format!(
            "INSERT INTO image_questions (image_url, question, options, correct_answer, explanation, category, subcategory)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {IMAGE_QUESTION_COLUMNS}"
        ))
        .bind(&question.image_url)
        .bind(&question.question)
        .bind(Json(&question.options))
        .bind(&question.correct_answer)
        .bind(&question.explanation)
        .bind(&question.category)
        .bind(&question.subcategory)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create image question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(created)
    }

    async fn record_quiz_attempt(
        &self,
        attempt: NewQuizAttempt,
    ) -> Result<QuizAttempt, AppError> {
        let recorded = sqlx::query_as::<_, QuizAttempt>(
            "INSERT INTO quiz_attempts
                 (user_id, question_id, image_question_id, user_answer, is_correct, category, subcategory)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, user_id, question_id, image_question_id, user_answer, is_correct,
                       category, subcategory, attempted_at",
        )
        .bind(attempt.user_id)
        .bind(attempt.question_id)
        .bind(attempt.image_question_id)
        .bind(&attempt.user_answer)
        .bind(attempt.is_correct)
        .bind(&attempt.category)
        .bind(&attempt.subcategory)
        .fetch_one(&self.pool)
        .await?;

        Ok(recorded)
    }

    async fn get_user_quiz_attempts(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            "SELECT id, user_id, question_id, image_question_id, user_answer, is_correct,
                    category, subcategory, attempted_at
             FROM quiz_attempts
             WHERE user_id = $1
             ORDER BY attempted_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}
