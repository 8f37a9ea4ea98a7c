use std::collections::HashSet;

use crate::models::{Achievement, AchievementRule};

use super::scorer::QuizResult;

/// Learner aggregates as of just before the activity being evaluated, so
/// first-activity rules can see whether anything came earlier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LearnerStats {
    pub total_attempts: u64,
    pub chat_interactions: u64,
}

impl LearnerStats {
    fn has_prior_activity(&self) -> bool {
        self.total_attempts > 0 || self.chat_interactions > 0
    }
}

/// Return the catalog entries whose rule is newly satisfied by this
/// activity and not already unlocked. `result` is `None` for activity that
/// carries no quiz result (a chat interaction); score rules cannot fire
/// then, only first-activity ones.
pub fn newly_earned<'a>(
    catalog: &'a [Achievement],
    unlocked: &HashSet<String>,
    result: Option<&QuizResult>,
    stats: &LearnerStats,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| !unlocked.contains(&a.id))
        .filter(|a| rule_satisfied(&a.rule, result, stats))
        .collect()
}

fn rule_satisfied(rule: &AchievementRule, result: Option<&QuizResult>, stats: &LearnerStats) -> bool {
    match rule {
        AchievementRule::PerfectScore => result.is_some_and(|r| r.score == 100),
        AchievementRule::ScoreAtLeast(threshold) => result.is_some_and(|r| r.score >= *threshold),
        AchievementRule::CorrectAtLeast(count) => {
            result.is_some_and(|r| r.correct_count >= *count)
        }
        AchievementRule::FirstActivity => !stats.has_prior_activity(),
    }
}
