// src/models/analytics.rs

use serde::{Deserialize, Serialize};

/// Estimated study time for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTimePoint {
    pub date: String,
    pub hours: f64,
    pub questions: i64,
}

/// Answer accuracy for one calendar day. `accuracy` is null on days with
/// no attempts (such days are only emitted for the fine-grained ranges).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyPoint {
    pub date: String,
    pub accuracy: Option<i64>,
    pub attempts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub name: String,
    pub score: i64,
    pub attempts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultySlice {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPoint {
    pub days_since_first: i64,
    pub rate: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDayPoint {
    pub name: String,
    pub questions: i64,
    pub accuracy: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapDay {
    pub date: String,
    pub minutes: i64,
    pub intensity: f64,
}

/// Per-topic accuracy. `attempts` is absent on the canned fallback entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStat {
    pub name: String,
    pub category: String,
    pub accuracy: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityPoint {
    pub date: String,
    pub velocity: i64,
}

/// Request-scoped analytics bundle. Computed from the attempt log on every
/// request; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub study_time: Vec<StudyTimePoint>,
    pub accuracy: Vec<AccuracyPoint>,
    pub category_performance: Vec<CategoryPerformance>,
    pub difficulty_distribution: Vec<DifficultySlice>,
    pub retention_rate: Vec<RetentionPoint>,
    pub time_of_day_data: Vec<TimeOfDayPoint>,
    pub heatmap_data: Vec<HeatmapDay>,
    pub quizzes_taken: i64,
    pub questions_answered: i64,
    pub average_accuracy: i64,
    pub study_streak: i64,
    pub weakest_topics: Vec<TopicStat>,
    pub strongest_topics: Vec<TopicStat>,
    pub total_study_time: f64,
    pub learning_velocity: Vec<VelocityPoint>,
}
