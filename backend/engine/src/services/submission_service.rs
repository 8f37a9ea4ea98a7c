use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::metrics::{ACHIEVEMENTS_UNLOCKED_TOTAL, ATTEMPTS_RECORDED_TOTAL};
use crate::models::{Achievement, ChatInteraction, FocusSession, Learner, Quiz, QuizAttempt};
use crate::rules::achievements::{self, LearnerStats};
use crate::rules::ledger;
use crate::rules::rewards::{self, RewardDelta, RewardPolicy};
use crate::rules::scorer::{self, QuizResult};
use crate::rules::streaks;
use crate::store::ProgressStore;
use crate::utils::time::day_window;

/// Everything one quiz submission produced.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub result: QuizResult,
    /// Quiz reward plus any achievement rewards, as applied to the ledger.
    pub reward: RewardDelta,
    pub learner: Learner,
    pub unlocked: Vec<Achievement>,
    pub attempt: QuizAttempt,
}

/// Runs the quiz submission pipeline: grade, reward under the selected
/// policy, evaluate achievements, fold everything into one progression
/// ledger application, advance the streak, and persist with a single
/// version-checked learner write.
pub struct SubmissionService {
    store: Arc<dyn ProgressStore>,
    catalog: Vec<Achievement>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self::with_catalog(store, Achievement::default_catalog())
    }

    pub fn with_catalog(store: Arc<dyn ProgressStore>, catalog: Vec<Achievement>) -> Self {
        Self { store, catalog }
    }

    pub async fn submit_quiz(
        &self,
        learner_id: &str,
        quiz: &Quiz,
        answers: &[Option<String>],
        elapsed_seconds: Option<u32>,
        policy: RewardPolicy,
    ) -> EngineResult<SubmissionOutcome> {
        self.submit_quiz_at(learner_id, quiz, answers, elapsed_seconds, policy, Utc::now())
            .await
    }

    /// Submission with an explicit clock, so day-boundary behavior is
    /// deterministic under test.
    ///
    /// Write ordering: the version-checked learner write goes first; the
    /// attempt record and unlock records are committed only after it
    /// succeeds. A `ConcurrentUpdateConflict` therefore commits nothing and
    /// the caller retries the whole submission against a fresh read.
    pub async fn submit_quiz_at(
        &self,
        learner_id: &str,
        quiz: &Quiz,
        answers: &[Option<String>],
        elapsed_seconds: Option<u32>,
        policy: RewardPolicy,
        now: DateTime<Utc>,
    ) -> EngineResult<SubmissionOutcome> {
        let learner = self
            .store
            .get_learner(learner_id)
            .await?
            .ok_or_else(|| EngineError::UnknownLearner(learner_id.to_string()))?;

        let result = scorer::score_quiz(quiz.question_type, &quiz.questions, answers)?;
        let quiz_reward = rewards::quiz_reward(policy, &result);

        // Aggregates as of before this attempt, so first-activity rules can
        // fire on it.
        let stats = LearnerStats {
            total_attempts: self.store.count_attempts(learner_id).await?,
            chat_interactions: self.store.count_chat_interactions(learner_id).await?,
        };
        let already_unlocked = self.store.unlocked_achievement_ids(learner_id).await?;
        let unlocked: Vec<Achievement> =
            achievements::newly_earned(&self.catalog, &already_unlocked, Some(&result), &stats)
                .into_iter()
                .cloned()
                .collect();

        let mut reward = quiz_reward;
        for achievement in &unlocked {
            reward = reward.combine(RewardDelta {
                experience: achievement.experience_reward,
                coins: achievement.coin_reward,
            });
        }

        let mut next = ledger::apply(&learner, reward);

        let today = now.date_naive();
        let (y_start, y_end) = day_window(today - Duration::days(1));
        let had_activity_yesterday = self
            .store
            .has_qualifying_activity(learner_id, y_start, y_end)
            .await?;
        let streak = streaks::advance(&learner, today, had_activity_yesterday);
        next.current_streak = streak.current_streak;
        next.longest_streak = streak.longest_streak;
        next.last_activity_date = Some(streak.last_activity_date);

        let stored = self.store.put_learner(&next, learner.version).await?;

        let attempt = QuizAttempt {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            subject: quiz.subject.clone(),
            difficulty: quiz.difficulty,
            question_type: quiz.question_type,
            answers: answers.to_vec(),
            elapsed_seconds,
            score: result.score,
            correct_count: result.correct_count,
            incorrect_count: result.incorrect_count,
            submitted_at: now,
        };
        self.store.append_attempt(&attempt).await?;

        for achievement in &unlocked {
            let record =
                crate::models::UnlockedAchievement::new(learner_id, &achievement.id, now);
            if self.store.insert_unlocked_if_absent(&record).await? {
                ACHIEVEMENTS_UNLOCKED_TOTAL
                    .with_label_values(&[achievement.id.as_str()])
                    .inc();
            }
        }

        ATTEMPTS_RECORDED_TOTAL
            .with_label_values(&[policy.as_str()])
            .inc();
        tracing::info!(
            "Quiz attempt recorded: learner={}, score={}, xp+{}, coins+{}, streak={}, unlocked={}",
            learner_id,
            result.score,
            reward.experience,
            reward.coins,
            stored.current_streak,
            unlocked.len()
        );

        Ok(SubmissionOutcome {
            result,
            reward,
            learner: stored,
            unlocked,
            attempt,
        })
    }

    pub async fn record_chat_interaction(
        &self,
        learner_id: &str,
    ) -> EngineResult<Vec<Achievement>> {
        self.record_chat_interaction_at(learner_id, Utc::now()).await
    }

    /// Chat does not count as streak activity, but a learner's first-ever
    /// interaction of any kind can unlock first-activity achievements.
    pub async fn record_chat_interaction_at(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<Achievement>> {
        let learner = self
            .store
            .get_learner(learner_id)
            .await?
            .ok_or_else(|| EngineError::UnknownLearner(learner_id.to_string()))?;

        let stats = LearnerStats {
            total_attempts: self.store.count_attempts(learner_id).await?,
            chat_interactions: self.store.count_chat_interactions(learner_id).await?,
        };
        let already_unlocked = self.store.unlocked_achievement_ids(learner_id).await?;
        let unlocked: Vec<Achievement> =
            achievements::newly_earned(&self.catalog, &already_unlocked, None, &stats)
                .into_iter()
                .cloned()
                .collect();

        if !unlocked.is_empty() {
            let mut reward = RewardDelta::default();
            for achievement in &unlocked {
                reward = reward.combine(RewardDelta {
                    experience: achievement.experience_reward,
                    coins: achievement.coin_reward,
                });
            }
            let next = ledger::apply(&learner, reward);
            self.store.put_learner(&next, learner.version).await?;
        }

        let interaction = ChatInteraction {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            at: now,
        };
        self.store.record_chat_interaction(&interaction).await?;

        for achievement in &unlocked {
            let record =
                crate::models::UnlockedAchievement::new(learner_id, &achievement.id, now);
            if self.store.insert_unlocked_if_absent(&record).await? {
                ACHIEVEMENTS_UNLOCKED_TOTAL
                    .with_label_values(&[achievement.id.as_str()])
                    .inc();
            }
        }

        Ok(unlocked)
    }

    pub async fn complete_focus_session(
        &self,
        learner_id: &str,
        started_at: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.complete_focus_session_at(learner_id, started_at, Utc::now())
            .await
    }

    /// A completed focus session is qualifying streak activity, so it goes
    /// through the same streak advance and version-checked write as a quiz.
    pub async fn complete_focus_session_at(
        &self,
        learner_id: &str,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let learner = self
            .store
            .get_learner(learner_id)
            .await?
            .ok_or_else(|| EngineError::UnknownLearner(learner_id.to_string()))?;

        let today = now.date_naive();
        let (y_start, y_end) = day_window(today - Duration::days(1));
        let had_activity_yesterday = self
            .store
            .has_qualifying_activity(learner_id, y_start, y_end)
            .await?;
        let streak = streaks::advance(&learner, today, had_activity_yesterday);

        if learner.last_activity_date != Some(streak.last_activity_date)
            || learner.current_streak != streak.current_streak
            || learner.longest_streak != streak.longest_streak
        {
            let mut next = learner.clone();
            next.current_streak = streak.current_streak;
            next.longest_streak = streak.longest_streak;
            next.last_activity_date = Some(streak.last_activity_date);
            self.store.put_learner(&next, learner.version).await?;
        }

        let session = FocusSession {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            completed: true,
            started_at,
            ended_at: Some(now),
        };
        self.store.record_focus_session(&session).await?;

        tracing::info!(
            "Focus session completed: learner={}, streak={}",
            learner_id,
            streak.current_streak
        );
        Ok(())
    }
}
