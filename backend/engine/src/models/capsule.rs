use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduled self-reflection record. Transitions `Active -> Reflected`
/// exactly once, and only through an explicit learner action; the sweep
/// worker merely identifies due candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCapsule {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    /// What the learner asked their future self to revisit.
    pub prompt: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub reflection_date: DateTime<Utc>,
    pub status: CapsuleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection_text: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::time::optional_datetime"
    )]
    pub reflected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapsuleStatus {
    Active,
    Reflected,
}
