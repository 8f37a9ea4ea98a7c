use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Persistent learner aggregate. Experience, coins and level only ever grow;
/// the progression ledger and streak tracker are the sole writers. `version`
/// is the optimistic-concurrency stamp checked on every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learner {
    #[serde(rename = "_id")]
    pub id: String,
    pub experience: u32,
    pub coins: u32,
    pub level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub version: u32,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Learner {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            experience: 0,
            coins: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

/// A completed focus session counts as qualifying streak activity, same as
/// a quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    pub completed: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "crate::utils::time::optional_datetime")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Minimal record of an AI-tutor chat interaction, kept only so the
/// first-activity achievement can fire on chat as well as on quizzes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInteraction {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub at: DateTime<Utc>,
}
