// src/services/quiz.rs
//
// Attempt recording and the aggregate-counter update rule, user stats
// reads, and the leaderboard builder.

use std::cmp::Ordering;

use chrono::{Local, NaiveDate};
use serde_json::{Value, json};

use crate::docstore::ProfileStore;
use crate::error::AppError;
use crate::models::quiz_attempt::{
    NewQuizAttempt, RecordAnswerRequest, RecordImageAnswerRequest,
};
use crate::models::user::{LeaderboardEntry, ProfileDocument, UserStats};
use crate::storage::Storage;

/// Category taxonomy for true/false quizzes.
pub fn quiz_categories() -> Value {
    json!({
        "Anatomy": [
            "Head and Neck",
            "Upper Limb",
            "Thorax",
            "Lower Limb",
            "Pelvis and Perineum",
            "Neuroanatomy",
            "Abdomen"
        ],
        "Physiology": [
            "Cell",
            "Nerve and Muscle",
            "Blood",
            "Endocrine",
            "Reproductive",
            "Gastrointestinal Tract",
            "Renal",
            "Cardiovascular System",
            "Respiration",
            "Medical Genetics",
            "Neurophysiology"
        ]
    })
}

/// Category taxonomy for image quizzes.
pub fn image_quiz_categories() -> Value {
    json!({
        "Anatomy": [
            "Head and Neck",
            "Upper Limb",
            "Thorax",
            "Lower Limb",
            "Abdomen",
            "Pelvis"
        ],
        "Histology": [
            "Epithelial Tissue",
            "Connective Tissue",
            "Muscle Tissue",
            "Nervous Tissue",
            "Cardiovascular System",
            "Respiratory System",
            "Digestive System",
            "Urinary System",
            "Reproductive System"
        ]
    })
}

/// Composite key under which a topic's counters are tracked.
pub fn category_key(category: &str, subcategory: Option<&str>) -> String {
    match subcategory {
        Some(sub) => format!("{category}/{sub}"),
        None => category.to_string(),
    }
}

/// Advances the aggregate counters by one answered question.
///
/// A subcategory answer touches only the `"<category>/<subcategory>"` key;
/// the bare `"<category>"` key accumulates only answers recorded without a
/// subcategory. The leaderboard's prefix summation depends on this split.
pub fn advance_stats(
    prior: &UserStats,
    is_correct: bool,
    category: &str,
    subcategory: Option<&str>,
    today: NaiveDate,
) -> UserStats {
    let streak = if is_correct { prior.streak + 1 } else { 0 };
    let mut category_stats = prior.category_stats.clone();
    let entry = category_stats
        .entry(category_key(category, subcategory))
        .or_default();
    entry.attempts += 1;
    if is_correct {
        entry.correct += 1;
    }

    UserStats {
        total_attempts: prior.total_attempts + 1,
        correct_answers: prior.correct_answers + if is_correct { 1 } else { 0 },
        streak,
        max_streak: streak.max(prior.max_streak),
        last_quiz_date: Some(today.format("%Y-%m-%d").to_string()),
        category_stats,
    }
}

/// Records a true/false answer: updates the profile document (authoritative
/// for the response) and mirrors the attempt into the relational store
/// best-effort. The two writes share no transaction.
pub async fn record_answer(
    storage: &dyn Storage,
    profiles: &dyn ProfileStore,
    data: RecordAnswerRequest,
) -> Result<UserStats, AppError> {
    let mut profile = profiles
        .get_profile(&data.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let today = Local::now().date_naive();
    let updated = advance_stats(
        &profile.stats(),
        data.is_correct,
        &data.category,
        data.subcategory.as_deref(),
        today,
    );
    profile.apply(&updated);
    profiles.put_profile(&data.user_id, &profile).await?;

    mirror_attempt(
        storage,
        &data.user_id,
        Some(data.question_id),
        None,
        data.is_correct,
        &data.category,
        data.subcategory.as_deref(),
        today,
    )
    .await;

    Ok(updated)
}

/// Records an image-quiz answer. Same update rule; the category key always
/// carries the subcategory and the question id lands in `image_question_id`.
pub async fn record_image_answer(
    storage: &dyn Storage,
    profiles: &dyn ProfileStore,
    data: RecordImageAnswerRequest,
) -> Result<UserStats, AppError> {
    let mut profile = profiles
        .get_profile(&data.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let today = Local::now().date_naive();
    let updated = advance_stats(
        &profile.stats(),
        data.is_correct,
        &data.category,
        Some(&data.subcategory),
        today,
    );
    profile.apply(&updated);
    profiles.put_profile(&data.user_id, &profile).await?;

    mirror_attempt(
        storage,
        &data.user_id,
        None,
        data.question_id.parse::<i64>().ok(),
        data.is_correct,
        &data.category,
        Some(&data.subcategory),
        today,
    )
    .await;

    Ok(updated)
}

/// Best-effort relational leg of the dual write: inserts the attempt row and
/// re-derives the stats mirror from the relational row's own snapshot.
/// Failures are logged and swallowed; the document-store update stands.
#[allow(clippy::too_many_arguments)]
async fn mirror_attempt(
    storage: &dyn Storage,
    external_id: &str,
    question_id: Option<i64>,
    image_question_id: Option<i64>,
    is_correct: bool,
    category: &str,
    subcategory: Option<&str>,
    today: NaiveDate,
) {
    let user = match storage.get_user_by_external_id(external_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!("Failed to resolve local user for {}: {}", external_id, err);
            return;
        }
    };

    let attempt = NewQuizAttempt {
        user_id: user.id,
        question_id,
        image_question_id,
        user_answer: is_correct.to_string(),
        is_correct,
        category: category.to_string(),
        subcategory: subcategory.map(str::to_string),
    };

    if let Err(err) = storage.record_quiz_attempt(attempt).await {
        tracing::warn!("Failed to record quiz attempt in local storage: {}", err);
        return;
    }

    let mirrored = advance_stats(
        &UserStats::from(&user),
        is_correct,
        category,
        subcategory,
        today,
    );
    if let Err(err) = storage.update_user_stats(user.id, &mirrored).await {
        tracing::warn!("Failed to mirror user stats for {}: {}", external_id, err);
    }
}

/// Current aggregate counters for one user, read from the profile store.
pub async fn get_user_stats(
    profiles: &dyn ProfileStore,
    user_id: &str,
) -> Result<UserStats, AppError> {
    let profile = profiles
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(profile.stats())
}

/// Scans every profile and ranks users by accuracy for the requested scope.
pub async fn get_leaderboard(
    profiles: &dyn ProfileStore,
    category: Option<&str>,
    subcategory: Option<&str>,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let all = profiles.list_profiles().await?;
    Ok(build_leaderboard(all, category, subcategory))
}

/// Pure leaderboard construction over a profile snapshot.
///
/// Scoping rules:
/// * category + subcategory: the exact composite key, or excluded.
/// * category only: sum over the bare key and every `"<category>/"` prefix.
/// * neither: the top-level totals.
/// Profiles with zero attempts in scope are dropped. Sorted by accuracy
/// descending; ties keep scan order.
pub fn build_leaderboard(
    profiles: Vec<(String, ProfileDocument)>,
    category: Option<&str>,
    subcategory: Option<&str>,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = profiles
        .into_iter()
        .filter_map(|(user_id, doc)| {
            let (attempts, correct) = match (category, subcategory) {
                (Some(cat), Some(sub)) => {
                    let stats = doc.category_stats.get(&format!("{cat}/{sub}"))?;
                    (stats.attempts, stats.correct)
                }
                (Some(cat), None) => {
                    let prefix = format!("{cat}/");
                    doc.category_stats
                        .iter()
                        .filter(|(key, _)| key.as_str() == cat || key.starts_with(&prefix))
                        .fold((0, 0), |(attempts, correct), (_, stats)| {
                            (attempts + stats.attempts, correct + stats.correct)
                        })
                }
                _ => (doc.total_attempts, doc.correct_answers),
            };

            if attempts == 0 {
                return None;
            }

            let display_name = if doc.display_name.is_empty() {
                "Anonymous".to_string()
            } else {
                doc.display_name.clone()
            };

            Some(LeaderboardEntry {
                user_id,
                display_name,
                accuracy: correct as f64 / attempts as f64 * 100.0,
                attempts,
                correct,
                streak: doc.streak,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(Ordering::Equal)
    });
    entries
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::user::CategoryStat;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn run_sequence(answers: &[(bool, &str, Option<&str>)]) -> UserStats {
        let mut stats = UserStats::default();
        for (is_correct, category, subcategory) in answers {
            stats = advance_stats(&stats, *is_correct, category, *subcategory, today());
        }
        stats
    }

    #[test]
    fn three_correct_then_one_incorrect_in_subcategory() {
        let stats = run_sequence(&[
            (true, "Anatomy", Some("Thorax")),
            (true, "Anatomy", Some("Thorax")),
            (true, "Anatomy", Some("Thorax")),
            (false, "Anatomy", Some("Thorax")),
        ]);

        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.correct_answers, 3);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.max_streak, 3);
        assert_eq!(
            stats.category_stats.get("Anatomy/Thorax"),
            Some(&CategoryStat {
                attempts: 4,
                correct: 3
            })
        );
        assert_eq!(stats.last_quiz_date.as_deref(), Some("2025-06-15"));
    }

    #[test]
    fn streak_resets_and_max_streak_is_monotone() {
        let mut stats = UserStats::default();
        let sequence = [true, true, false, true, true, true, false];
        let mut previous_max = 0;

        for is_correct in sequence {
            stats = advance_stats(&stats, is_correct, "Physiology", None, today());
            assert!(stats.max_streak >= previous_max);
            previous_max = stats.max_streak;
            if !is_correct {
                assert_eq!(stats.streak, 0);
            }
        }

        assert_eq!(stats.streak, 0);
        assert_eq!(stats.max_streak, 3);
    }

    #[test]
    fn correct_never_exceeds_attempts() {
        let mut stats = UserStats::default();
        let answers = [true, false, true, true, false, false, true];

        for (i, is_correct) in answers.into_iter().enumerate() {
            let subcategory = if i % 2 == 0 { Some("Blood") } else { None };
            stats = advance_stats(&stats, is_correct, "Physiology", subcategory, today());

            assert!(stats.correct_answers <= stats.total_attempts);
            for entry in stats.category_stats.values() {
                assert!(entry.correct <= entry.attempts);
            }
        }
    }

    #[test]
    fn bare_and_composite_keys_accumulate_separately() {
        let stats = run_sequence(&[
            (true, "Anatomy", None),
            (true, "Anatomy", Some("Thorax")),
            (false, "Anatomy", None),
        ]);

        assert_eq!(
            stats.category_stats.get("Anatomy"),
            Some(&CategoryStat {
                attempts: 2,
                correct: 1
            })
        );
        assert_eq!(
            stats.category_stats.get("Anatomy/Thorax"),
            Some(&CategoryStat {
                attempts: 1,
                correct: 1
            })
        );
    }

    fn profile(
        display_name: &str,
        totals: (i64, i64),
        streak: i64,
        categories: &[(&str, i64, i64)],
    ) -> ProfileDocument {
        let mut category_stats = HashMap::new();
        for (key, attempts, correct) in categories {
            category_stats.insert(
                key.to_string(),
                CategoryStat {
                    attempts: *attempts,
                    correct: *correct,
                },
            );
        }
        ProfileDocument {
            display_name: display_name.to_string(),
            email: format!("{display_name}@example.com"),
            total_attempts: totals.0,
            correct_answers: totals.1,
            streak,
            max_streak: streak,
            last_quiz_date: None,
            category_stats,
        }
    }

    #[test]
    fn overall_leaderboard_sorts_by_accuracy_and_drops_inactive() {
        let profiles = vec![
            ("u1".to_string(), profile("alice", (10, 6), 2, &[])),
            ("u2".to_string(), profile("bob", (0, 0), 0, &[])),
            ("u3".to_string(), profile("carol", (8, 7), 5, &[])),
        ];

        let board = build_leaderboard(profiles, None, None);

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].display_name, "carol");
        assert_eq!(board[1].display_name, "alice");
        assert!(board[0].accuracy > board[1].accuracy);
    }

    #[test]
    fn category_scope_sums_bare_key_and_subcategory_prefixes() {
        let profiles = vec![(
            "u1".to_string(),
            profile(
                "alice",
                (30, 20),
                1,
                &[
                    ("Anatomy", 10, 8),
                    ("Anatomy/Thorax", 5, 5),
                    ("Physiology", 15, 7),
                ],
            ),
        )];

        let board = build_leaderboard(profiles, Some("Anatomy"), None);

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].attempts, 15);
        assert_eq!(board[0].correct, 13);
        assert!((board[0].accuracy - 13.0 / 15.0 * 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn subcategory_scope_uses_exact_key_only() {
        let profiles = vec![
            (
                "u1".to_string(),
                profile("alice", (15, 13), 1, &[("Anatomy", 10, 8), ("Anatomy/Thorax", 5, 5)]),
            ),
            (
                "u2".to_string(),
                profile("bob", (10, 8), 0, &[("Anatomy", 10, 8)]),
            ),
        ];

        let board = build_leaderboard(profiles, Some("Anatomy"), Some("Thorax"));

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, "u1");
        assert_eq!(board[0].attempts, 5);
        assert_eq!(board[0].correct, 5);
    }

    #[test]
    fn empty_collection_yields_empty_leaderboard() {
        assert!(build_leaderboard(Vec::new(), None, None).is_empty());
    }

    #[test]
    fn anonymous_fallback_for_missing_display_name() {
        let profiles = vec![("u1".to_string(), profile("", (4, 2), 0, &[]))];
        let board = build_leaderboard(profiles, None, None);
        assert_eq!(board[0].display_name, "Anonymous");
    }
}
