use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::metrics::UPDATE_CONFLICTS_TOTAL;
use crate::models::{
    CapsuleStatus, ChatInteraction, FocusSession, LeaderboardRow, Learner, PeerChallenge,
    QuizAttempt, TimeCapsule, UnlockedAchievement,
};

use super::ProgressStore;

/// In-memory store for tests and local development. Honors the same
/// versioned compare-and-swap semantics as the MongoDB implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    learners: HashMap<String, Learner>,
    attempts: Vec<QuizAttempt>,
    focus_sessions: Vec<FocusSession>,
    chat_interactions: Vec<ChatInteraction>,
    challenges: HashMap<String, PeerChallenge>,
    leaderboard: HashMap<String, LeaderboardRow>,
    unlocked: HashMap<String, UnlockedAchievement>,
    capsules: HashMap<String, TimeCapsule>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Mutex poisoning only happens if a holder panicked; recover the
        // data rather than cascading the panic through the store.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_learner(&self, learner_id: &str) -> EngineResult<Option<Learner>> {
        Ok(self.lock().learners.get(learner_id).cloned())
    }

    async fn insert_learner(&self, learner: &Learner) -> EngineResult<()> {
        self.lock()
            .learners
            .insert(learner.id.clone(), learner.clone());
        Ok(())
    }

    async fn put_learner(&self, learner: &Learner, expected_version: u32) -> EngineResult<Learner> {
        let mut inner = self.lock();
        let stored = inner
            .learners
            .get(&learner.id)
            .ok_or_else(|| EngineError::UnknownLearner(learner.id.clone()))?;

        if stored.version != expected_version {
            UPDATE_CONFLICTS_TOTAL.with_label_values(&["learner"]).inc();
            return Err(EngineError::ConcurrentUpdateConflict {
                entity: "learner",
                id: learner.id.clone(),
            });
        }

        let mut next = learner.clone();
        next.version = expected_version + 1;
        inner.learners.insert(next.id.clone(), next.clone());
        Ok(next)
    }

    async fn append_attempt(&self, attempt: &QuizAttempt) -> EngineResult<()> {
        self.lock().attempts.push(attempt.clone());
        Ok(())
    }

    async fn count_attempts(&self, learner_id: &str) -> EngineResult<u64> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .filter(|a| a.learner_id == learner_id)
            .count() as u64)
    }

    async fn recent_scores(
        &self,
        learner_id: &str,
        subject: &str,
        limit: usize,
    ) -> EngineResult<Vec<u8>> {
        let inner = self.lock();
        let mut matching: Vec<&QuizAttempt> = inner
            .attempts
            .iter()
            .filter(|a| a.learner_id == learner_id && a.subject == subject)
            .collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(matching.into_iter().take(limit).map(|a| a.score).collect())
    }

    async fn record_focus_session(&self, session: &FocusSession) -> EngineResult<()> {
        self.lock().focus_sessions.push(session.clone());
        Ok(())
    }

    async fn record_chat_interaction(&self, interaction: &ChatInteraction) -> EngineResult<()> {
        self.lock().chat_interactions.push(interaction.clone());
        Ok(())
    }

    async fn count_chat_interactions(&self, learner_id: &str) -> EngineResult<u64> {
        Ok(self
            .lock()
            .chat_interactions
            .iter()
            .filter(|c| c.learner_id == learner_id)
            .count() as u64)
    }

    async fn has_qualifying_activity(
        &self,
        learner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<bool> {
        let inner = self.lock();
        let attempted = inner.attempts.iter().any(|a| {
            a.learner_id == learner_id && a.submitted_at >= start && a.submitted_at < end
        });
        if attempted {
            return Ok(true);
        }
        Ok(inner.focus_sessions.iter().any(|s| {
            s.learner_id == learner_id
                && s.completed
                && s.ended_at.is_some_and(|t| t >= start && t < end)
        }))
    }

    async fn insert_challenge(&self, challenge: &PeerChallenge) -> EngineResult<()> {
        self.lock()
            .challenges
            .insert(challenge.id.clone(), challenge.clone());
        Ok(())
    }

    async fn get_challenge(&self, challenge_id: &str) -> EngineResult<Option<PeerChallenge>> {
        Ok(self.lock().challenges.get(challenge_id).cloned())
    }

    async fn get_leaderboard_row(
        &self,
        challenge_id: &str,
        participant_id: &str,
    ) -> EngineResult<Option<LeaderboardRow>> {
        let id = LeaderboardRow::row_id(challenge_id, participant_id);
        Ok(self.lock().leaderboard.get(&id).cloned())
    }

    async fn put_leaderboard_row(
        &self,
        row: &LeaderboardRow,
        expected_version: Option<u32>,
    ) -> EngineResult<LeaderboardRow> {
        let mut inner = self.lock();
        let conflict = || {
            UPDATE_CONFLICTS_TOTAL
                .with_label_values(&["leaderboard_row"])
                .inc();
            EngineError::ConcurrentUpdateConflict {
                entity: "leaderboard_row",
                id: row.id.clone(),
            }
        };

        let stored = inner.leaderboard.get(&row.id).cloned();
        match (expected_version, stored) {
            (None, None) => {
                inner.leaderboard.insert(row.id.clone(), row.clone());
                Ok(row.clone())
            }
            (None, Some(_)) => Err(conflict()),
            (Some(_), None) => Err(conflict()),
            (Some(version), Some(stored)) => {
                if stored.version != version {
                    return Err(conflict());
                }
                let mut next = row.clone();
                next.version = version + 1;
                inner.leaderboard.insert(next.id.clone(), next.clone());
                Ok(next)
            }
        }
    }

    async fn challenge_rows(&self, challenge_id: &str) -> EngineResult<Vec<LeaderboardRow>> {
        Ok(self
            .lock()
            .leaderboard
            .values()
            .filter(|r| r.challenge_id == challenge_id)
            .cloned()
            .collect())
    }

    async fn unlocked_achievement_ids(&self, learner_id: &str) -> EngineResult<HashSet<String>> {
        Ok(self
            .lock()
            .unlocked
            .values()
            .filter(|u| u.learner_id == learner_id)
            .map(|u| u.achievement_id.clone())
            .collect())
    }

    async fn insert_unlocked_if_absent(&self, unlock: &UnlockedAchievement) -> EngineResult<bool> {
        let mut inner = self.lock();
        if inner.unlocked.contains_key(&unlock.id) {
            return Ok(false);
        }
        inner.unlocked.insert(unlock.id.clone(), unlock.clone());
        Ok(true)
    }

    async fn insert_capsule(&self, capsule: &TimeCapsule) -> EngineResult<()> {
        self.lock()
            .capsules
            .insert(capsule.id.clone(), capsule.clone());
        Ok(())
    }

    async fn get_capsule(&self, capsule_id: &str) -> EngineResult<Option<TimeCapsule>> {
        Ok(self.lock().capsules.get(capsule_id).cloned())
    }

    async fn active_capsules_due(&self, now: DateTime<Utc>) -> EngineResult<Vec<TimeCapsule>> {
        Ok(self
            .lock()
            .capsules
            .values()
            .filter(|c| c.status == CapsuleStatus::Active && c.reflection_date <= now)
            .cloned()
            .collect())
    }

    async fn reflect_capsule(
        &self,
        capsule_id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<bool> {
        let mut inner = self.lock();
        match inner.capsules.get_mut(capsule_id) {
            Some(capsule) if capsule.status == CapsuleStatus::Active => {
                capsule.status = CapsuleStatus::Reflected;
                capsule.reflection_text = Some(text.to_string());
                capsule.reflected_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
