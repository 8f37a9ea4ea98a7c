use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static catalog entry. Rules are typed conditions over the just-recorded
/// quiz result and the learner's aggregate stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub rule: AchievementRule,
    pub experience_reward: u32,
    pub coin_reward: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementRule {
    /// Quiz score of exactly 100.
    PerfectScore,
    /// Quiz score at or above the threshold.
    ScoreAtLeast(u8),
    /// At least this many correct answers in one quiz.
    CorrectAtLeast(u32),
    /// First-ever quiz attempt or chat interaction.
    FirstActivity,
}

impl Achievement {
    /// Built-in catalog. Deployments can extend or replace it; the evaluator
    /// treats the catalog as opaque reference data.
    pub fn default_catalog() -> Vec<Achievement> {
        vec![
            Achievement {
                id: "first-steps".to_string(),
                name: "First Steps".to_string(),
                description: "Complete your first quiz or chat with the tutor".to_string(),
                rule: AchievementRule::FirstActivity,
                experience_reward: 50,
                coin_reward: 10,
            },
            Achievement {
                id: "perfect-score".to_string(),
                name: "Perfect Score".to_string(),
                description: "Score 100% on a quiz".to_string(),
                rule: AchievementRule::PerfectScore,
                experience_reward: 100,
                coin_reward: 25,
            },
            Achievement {
                id: "high-achiever".to_string(),
                name: "High Achiever".to_string(),
                description: "Score 80% or higher on a quiz".to_string(),
                rule: AchievementRule::ScoreAtLeast(80),
                experience_reward: 50,
                coin_reward: 15,
            },
            Achievement {
                id: "quiz-master".to_string(),
                name: "Quiz Master".to_string(),
                description: "Answer 5 or more questions correctly in one quiz".to_string(),
                rule: AchievementRule::CorrectAtLeast(5),
                experience_reward: 75,
                coin_reward: 20,
            },
        ]
    }
}

/// Join record, created at most once per (learner, achievement) pair. The
/// composite id makes re-insertion a detectable duplicate in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    pub achievement_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub unlocked_at: DateTime<Utc>,
}

impl UnlockedAchievement {
    pub fn new(learner_id: &str, achievement_id: &str, unlocked_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}:{}", learner_id, achievement_id),
            learner_id: learner_id.to_string(),
            achievement_id: achievement_id.to_string(),
            unlocked_at,
        }
    }
}
