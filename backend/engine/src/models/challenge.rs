use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, Question, QuestionType};

/// Immutable peer challenge: a fixed question set plus challenge metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerChallenge {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub creator_id: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub questions: Vec<Question>,
    pub time_limit_seconds: u32,
    pub max_attempts: u32,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// One row per (challenge, participant). `best_score` never decreases;
/// `attempt_count` grows by exactly one per submitted attempt whether or not
/// the best score changed. `version` guards the read-modify-write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub challenge_id: String,
    pub participant_id: String,
    pub best_score: u8,
    pub best_time_seconds: Option<u32>,
    pub attempt_count: u32,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub last_attempt_at: DateTime<Utc>,
    pub version: u32,
}

impl LeaderboardRow {
    pub fn row_id(challenge_id: &str, participant_id: &str) -> String {
        format!("{}:{}", challenge_id, participant_id)
    }
}
