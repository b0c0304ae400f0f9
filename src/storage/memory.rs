// src/storage/memory.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use sqlx::types::Json;

use crate::error::AppError;
use crate::models::image_question::{CreateImageQuestionRequest, ImageQuestion};
use crate::models::question::{CreateQuestionRequest, Question};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::models::user::{CreateUserRequest, User, UserStats};
use crate::storage::Storage;

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    questions: HashMap<i64, Question>,
    image_questions: HashMap<i64, ImageQuestion>,
    quiz_attempts: HashMap<i64, QuizAttempt>,
    next_user_id: i64,
    next_question_id: i64,
    next_image_question_id: i64,
    next_attempt_id: i64,
}

/// In-memory storage with the same behavior as [`super::PgStorage`].
/// Backs the integration tests; no database required.
#[derive(Default)]
pub struct MemStorage {
    inner: Mutex<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("storage mutex poisoned")
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.firebase_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn create_user(&self, user: CreateUserRequest) -> Result<User, AppError> {
        let mut inner = self.lock();

        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "User '{}' already exists",
                user.username
            )));
        }

        inner.next_user_id += 1;
        let id = inner.next_user_id;
        let created = User {
            id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            email_verified: false,
            created_at: Some(Utc::now()),
            total_attempts: 0,
            correct_answers: 0,
            streak: 0,
            max_streak: 0,
            last_quiz_date: None,
            category_stats: Json(HashMap::new()),
            firebase_id: user.firebase_id,
        };

        inner.users.insert(id, created.clone());
        Ok(created)
    }

    async fn update_user_stats(&self, user_id: i64, stats: &UserStats) -> Result<(), AppError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        user.total_attempts = stats.total_attempts;
        user.correct_answers = stats.correct_answers;
        user.streak = stats.streak;
        user.max_streak = stats.max_streak;
        user.last_quiz_date = stats.last_quiz_date.clone();
        user.category_stats = Json(stats.category_stats.clone());
        Ok(())
    }

    async fn get_questions_by_category(
        &self,
        category: &str,
        subcategory: Option<&str>,
    ) -> Result<Vec<Question>, AppError> {
        let inner = self.lock();
        let mut questions: Vec<Question> = inner
            .questions
            .values()
            .filter(|q| {
                q.category == category
                    && subcategory.is_none_or(|s| q.subcategory.as_deref() == Some(s))
            })
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.id);
        Ok(questions)
    }

    async fn get_random_question(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> Result<Option<Question>, AppError> {
        let inner = self.lock();
        let matching: Vec<&Question> = inner
            .questions
            .values()
            .filter(|q| {
                category.is_none_or(|c| q.category == c)
                    && subcategory.is_none_or(|s| q.subcategory.as_deref() == Some(s))
            })
            .collect();

        if matching.is_empty() {
            return Ok(None);
        }

        let index = rand::thread_rng().gen_range(0..matching.len());
        Ok(Some(matching[index].clone()))
    }

    async fn create_question(&self, question: CreateQuestionRequest) -> Result<Question, AppError> {
        let mut inner = self.lock();
        inner.next_question_id += 1;
        let id = inner.next_question_id;
        let created = Question {
            id,
            question: question.question,
            answer: question.answer,
            explanation: question.explanation,
            ai_explanation: question.ai_explanation,
            references: question.references.map(Json),
            category: question.category,
            subcategory: question.subcategory,
            created_at: Some(Utc::now()),
        };

        inner.questions.insert(id, created.clone());
        Ok(created)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, AppError> {
        let inner = self.lock();
        let mut categories: Vec<String> =
            inner.questions.values().map(|q| q.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn get_random_image_question(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> Result<Option<ImageQuestion>, AppError> {
        let inner = self.lock();
        let matching: Vec<&ImageQuestion> = inner
            .image_questions
            .values()
            .filter(|q| {
                category.is_none_or(|c| q.category == c)
                    && subcategory.is_none_or(|s| q.subcategory == s)
            })
            .collect();

        if matching.is_empty() {
            return Ok(None);
        }

        let index = rand::thread_rng().gen_range(0..matching.len());
        Ok(Some(matching[index].clone()))
    }

    async fn create_image_question(
        &self,
        question: CreateImageQuestionRequest,
    ) -> Result<ImageQuestion, AppError> {
        let mut inner = self.lock();
        inner.next_image_question_id += 1;
        let id = inner.next_image_question_id;
        let created = ImageQuestion {
            id,
            image_url: question.image_url,
            question: question.question,
            options: Json(question.options),
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            category: question.category,
            subcategory: question.subcategory,
            created_at: Some(Utc::now()),
        };

        inner.image_questions.insert(id, created.clone());
        Ok(created)
    }

    async fn record_quiz_attempt(
        &self,
        attempt: NewQuizAttempt,
    ) -> Result<QuizAttempt, AppError> {
        let mut inner = self.lock();

        if !inner.users.contains_key(&attempt.user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        inner.next_attempt_id += 1;
        let id = inner.next_attempt_id;
        let recorded = QuizAttempt {
            id,
            user_id: attempt.user_id,
            question_id: attempt.question_id,
            image_question_id: attempt.image_question_id,
            user_answer: attempt.user_answer,
            is_correct: attempt.is_correct,
            category: attempt.category,
            subcategory: attempt.subcategory,
            attempted_at: Utc::now(),
        };

        inner.quiz_attempts.insert(id, recorded.clone());
        Ok(recorded)
    }

    async fn get_user_quiz_attempts(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError> {
        let inner = self.lock();
        let mut attempts: Vec<QuizAttempt> = inner
            .quiz_attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.id);
        Ok(attempts)
    }
}
