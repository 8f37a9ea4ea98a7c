use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, QuestionType};

/// Generated quiz. Built once by the content-generation service and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    /// Canonical expected answer. An option index rendered as a string for
    /// choice-based types, free text otherwise.
    pub expected_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub points: u32,
}

/// Append-only record of one learner answering one quiz. Quiz metadata is
/// captured on the attempt because ad-hoc quizzes are not persisted
/// themselves. This history is the sole input to the streak tracker, the
/// difficulty selector and the achievement evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    /// Raw submitted answers, aligned with question position.
    pub answers: Vec<Option<String>>,
    pub elapsed_seconds: Option<u32>,
    pub score: u8,
    pub correct_count: u32,
    pub incorrect_count: u32,
    /// Persisted as a native BSON datetime; the streak tracker's day-window
    /// range filters depend on chronological ordering in the store.
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
}
