use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::EngineResult;
use crate::models::{
    ChatInteraction, FocusSession, LeaderboardRow, Learner, PeerChallenge, QuizAttempt,
    TimeCapsule, UnlockedAchievement,
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Persistence contract of the engine. Learner and leaderboard writes are
/// version-checked compare-and-swap operations; a failed check surfaces as
/// `ConcurrentUpdateConflict` and must be retried by the caller with a
/// fresh read.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    // Learner aggregates
    async fn get_learner(&self, learner_id: &str) -> EngineResult<Option<Learner>>;
    async fn insert_learner(&self, learner: &Learner) -> EngineResult<()>;
    /// Persist `learner` only if the stored version still equals
    /// `expected_version`; the stored copy gets `expected_version + 1`.
    async fn put_learner(&self, learner: &Learner, expected_version: u32) -> EngineResult<Learner>;

    // Activity history (append-only)
    async fn append_attempt(&self, attempt: &QuizAttempt) -> EngineResult<()>;
    async fn count_attempts(&self, learner_id: &str) -> EngineResult<u64>;
    /// Most recent scores for (learner, subject), newest first.
    async fn recent_scores(
        &self,
        learner_id: &str,
        subject: &str,
        limit: usize,
    ) -> EngineResult<Vec<u8>>;
    async fn record_focus_session(&self, session: &FocusSession) -> EngineResult<()>;
    async fn record_chat_interaction(&self, interaction: &ChatInteraction) -> EngineResult<()>;
    async fn count_chat_interactions(&self, learner_id: &str) -> EngineResult<u64>;
    /// Did this learner have qualifying activity (a quiz attempt or a
    /// completed focus session) within `[start, end)`?
    async fn has_qualifying_activity(
        &self,
        learner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<bool>;

    // Peer challenges & leaderboards
    async fn insert_challenge(&self, challenge: &PeerChallenge) -> EngineResult<()>;
    async fn get_challenge(&self, challenge_id: &str) -> EngineResult<Option<PeerChallenge>>;
    async fn get_leaderboard_row(
        &self,
        challenge_id: &str,
        participant_id: &str,
    ) -> EngineResult<Option<LeaderboardRow>>;
    /// Insert (`expected_version` = None) or replace under a version check.
    async fn put_leaderboard_row(
        &self,
        row: &LeaderboardRow,
        expected_version: Option<u32>,
    ) -> EngineResult<LeaderboardRow>;
    async fn challenge_rows(&self, challenge_id: &str) -> EngineResult<Vec<LeaderboardRow>>;

    // Achievements
    async fn unlocked_achievement_ids(&self, learner_id: &str) -> EngineResult<HashSet<String>>;
    /// Idempotent: returns false (and writes nothing) if the (learner,
    /// achievement) pair is already present.
    async fn insert_unlocked_if_absent(&self, unlock: &UnlockedAchievement) -> EngineResult<bool>;

    // Time capsules
    async fn insert_capsule(&self, capsule: &TimeCapsule) -> EngineResult<()>;
    async fn get_capsule(&self, capsule_id: &str) -> EngineResult<Option<TimeCapsule>>;
    async fn active_capsules_due(&self, now: DateTime<Utc>) -> EngineResult<Vec<TimeCapsule>>;
    /// Compare-and-swap on status: `Active -> Reflected` exactly once.
    /// Returns false if the capsule was not active anymore.
    async fn reflect_capsule(
        &self,
        capsule_id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<bool>;
}
