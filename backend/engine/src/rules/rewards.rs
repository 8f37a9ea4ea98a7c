use super::scorer::QuizResult;

/// Which reward formula applies. The two policies produce deliberately
/// different numbers for the same score and are selected by caller context;
/// they must stay separate or observed rewards would silently change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardPolicy {
    /// Ad-hoc AI-generated quizzes requested directly in chat.
    AdHocQuiz,
    /// Textbook-derived quizzes and peer-challenge attempts.
    CurriculumQuiz,
}

impl RewardPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardPolicy::AdHocQuiz => "ad_hoc",
            RewardPolicy::CurriculumQuiz => "curriculum",
        }
    }
}

/// Non-negative experience and coin deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardDelta {
    pub experience: u32,
    pub coins: u32,
}

impl RewardDelta {
    pub fn combine(self, other: RewardDelta) -> RewardDelta {
        RewardDelta {
            experience: self.experience + other.experience,
            coins: self.coins + other.coins,
        }
    }
}

/// Map a quiz result to its reward under the selected policy.
pub fn quiz_reward(policy: RewardPolicy, result: &QuizResult) -> RewardDelta {
    let score = u32::from(result.score);
    match policy {
        RewardPolicy::AdHocQuiz => RewardDelta {
            experience: ((f64::from(result.score) * 0.5).round() as u32
                + result.correct_count * 5)
                .max(10),
            coins: match result.score {
                s if s >= 80 => 50,
                s if s >= 60 => 25,
                _ => 10,
            },
        },
        RewardPolicy::CurriculumQuiz => RewardDelta {
            experience: score * 2,
            coins: ((f64::from(result.score) / 20.0).round() as u32).max(1),
        },
    }
}
