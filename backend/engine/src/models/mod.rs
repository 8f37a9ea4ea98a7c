use serde::{Deserialize, Serialize};

pub mod achievement;
pub mod capsule;
pub mod challenge;
pub mod learner;
pub mod quiz;

pub use achievement::{Achievement, AchievementRule, UnlockedAchievement};
pub use capsule::{CapsuleStatus, TimeCapsule};
pub use challenge::{LeaderboardRow, PeerChallenge};
pub use learner::{ChatInteraction, FocusSession, Learner};
pub use quiz::{Question, Quiz, QuizAttempt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    AssertionReason,
    ShortAnswer,
    MediumAnswer,
    LongAnswer,
}

impl QuestionType {
    /// Choice-based types are graded by exact match; the rest fall through
    /// to the lenient open-answer heuristic.
    pub fn is_choice_based(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoice | QuestionType::AssertionReason
        )
    }
}
