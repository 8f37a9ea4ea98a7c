mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use studyquest_engine::error::{EngineError, EngineResult};
use studyquest_engine::models::{
    ChatInteraction, FocusSession, LeaderboardRow, Learner, PeerChallenge, QuizAttempt,
    TimeCapsule, UnlockedAchievement,
};
use studyquest_engine::services::challenge_service::ChallengeService;
use studyquest_engine::store::{MemoryStore, ProgressStore};

use common::{answers_with_correct, at, seeded_store, test_challenge};

#[tokio::test]
async fn best_score_is_monotone_and_ties_keep_the_earlier_time() {
    let store = seeded_store("creator").await;
    store
        .insert_learner(&Learner::new("rival"))
        .await
        .unwrap();
    let service = ChallengeService::new(store.clone());

    let challenge = test_challenge("ch-1", "creator", 20);
    service.create_challenge(&challenge).await.unwrap();

    // 16/20 correct -> score 80, 120s.
    let outcome = service
        .submit_attempt_at("ch-1", "rival", &answers_with_correct(16, 20), Some(120), at(2026, 4, 1, 9))
        .await
        .unwrap();
    assert_eq!(outcome.row.best_score, 80);
    assert_eq!(outcome.row.best_time_seconds, Some(120));
    assert_eq!(outcome.row.attempt_count, 1);

    // Tie at 80 with a faster time: attempt counted, best untouched.
    let outcome = service
        .submit_attempt_at("ch-1", "rival", &answers_with_correct(16, 20), Some(90), at(2026, 4, 1, 10))
        .await
        .unwrap();
    assert_eq!(outcome.row.best_score, 80);
    assert_eq!(outcome.row.best_time_seconds, Some(120));
    assert_eq!(outcome.row.attempt_count, 2);

    // Strictly higher score overwrites both fields, even with a slower time.
    let outcome = service
        .submit_attempt_at("ch-1", "rival", &answers_with_correct(17, 20), Some(150), at(2026, 4, 1, 11))
        .await
        .unwrap();
    assert_eq!(outcome.row.best_score, 85);
    assert_eq!(outcome.row.best_time_seconds, Some(150));
    assert_eq!(outcome.row.attempt_count, 3);

    // A worse attempt afterwards only bumps the count.
    let outcome = service
        .submit_attempt_at("ch-1", "rival", &answers_with_correct(5, 20), Some(60), at(2026, 4, 1, 12))
        .await
        .unwrap();
    assert_eq!(outcome.row.best_score, 85);
    assert_eq!(outcome.row.best_time_seconds, Some(150));
    assert_eq!(outcome.row.attempt_count, 4);
}

#[tokio::test]
async fn unknown_challenge_is_rejected() {
    let store = seeded_store("rival").await;
    let service = ChallengeService::new(store.clone());

    let result = service
        .submit_attempt("nope", "rival", &answers_with_correct(1, 1), None)
        .await;
    assert!(matches!(result, Err(EngineError::UnknownChallenge(id)) if id == "nope"));
}

#[tokio::test]
async fn leaderboard_ranks_by_score_then_time() {
    let store = seeded_store("creator").await;
    for id in ["fast", "slow", "low"] {
        store.insert_learner(&Learner::new(id)).await.unwrap();
    }
    let service = ChallengeService::new(store.clone());

    let challenge = test_challenge("ch-1", "creator", 10);
    service.create_challenge(&challenge).await.unwrap();

    service
        .submit_attempt_at("ch-1", "slow", &answers_with_correct(9, 10), Some(200), at(2026, 4, 2, 9))
        .await
        .unwrap();
    service
        .submit_attempt_at("ch-1", "fast", &answers_with_correct(9, 10), Some(80), at(2026, 4, 2, 10))
        .await
        .unwrap();
    service
        .submit_attempt_at("ch-1", "low", &answers_with_correct(4, 10), Some(30), at(2026, 4, 2, 11))
        .await
        .unwrap();

    let rows = service.leaderboard("ch-1").await.unwrap();
    let order: Vec<&str> = rows.iter().map(|r| r.participant_id.as_str()).collect();
    assert_eq!(order, vec!["fast", "slow", "low"]);
}

#[tokio::test]
async fn challenge_attempts_still_pay_curriculum_rewards() {
    let store = seeded_store("creator").await;
    store.insert_learner(&Learner::new("rival")).await.unwrap();
    let service = ChallengeService::new(store.clone());

    let challenge = test_challenge("ch-1", "creator", 10);
    service.create_challenge(&challenge).await.unwrap();

    let outcome = service
        .submit_attempt_at("ch-1", "rival", &answers_with_correct(10, 10), Some(45), at(2026, 4, 3, 9))
        .await
        .unwrap();

    // Curriculum policy: 100 -> 200 xp, 5 coins, plus default-catalog
    // unlocks for a perfect first attempt.
    assert_eq!(outcome.submission.result.score, 100);
    assert_eq!(outcome.submission.unlocked.len(), 4);
    assert_eq!(outcome.submission.learner.experience, 475);
}

/// Delegates to a `MemoryStore`, but the first leaderboard row write loses
/// to an interleaved attempt: a rival copy of the row lands first and the
/// write comes back as a conflict.
struct RacingRowStore {
    inner: MemoryStore,
    raced: AtomicBool,
}

impl RacingRowStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            raced: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ProgressStore for RacingRowStore {
    async fn get_learner(&self, learner_id: &str) -> EngineResult<Option<Learner>> {
        self.inner.get_learner(learner_id).await
    }

    async fn insert_learner(&self, learner: &Learner) -> EngineResult<()> {
        self.inner.insert_learner(learner).await
    }

    async fn put_learner(&self, learner: &Learner, expected_version: u32) -> EngineResult<Learner> {
        self.inner.put_learner(learner, expected_version).await
    }

    async fn append_attempt(&self, attempt: &QuizAttempt) -> EngineResult<()> {
        self.inner.append_attempt(attempt).await
    }

    async fn count_attempts(&self, learner_id: &str) -> EngineResult<u64> {
        self.inner.count_attempts(learner_id).await
    }

    async fn recent_scores(
        &self,
        learner_id: &str,
        subject: &str,
        limit: usize,
    ) -> EngineResult<Vec<u8>> {
        self.inner.recent_scores(learner_id, subject, limit).await
    }

    async fn record_focus_session(&self, session: &FocusSession) -> EngineResult<()> {
        self.inner.record_focus_session(session).await
    }

    async fn record_chat_interaction(&self, interaction: &ChatInteraction) -> EngineResult<()> {
        self.inner.record_chat_interaction(interaction).await
    }

    async fn count_chat_interactions(&self, learner_id: &str) -> EngineResult<u64> {
        self.inner.count_chat_interactions(learner_id).await
    }

    async fn has_qualifying_activity(
        &self,
        learner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<bool> {
        self.inner.has_qualifying_activity(learner_id, start, end).await
    }

    async fn insert_challenge(&self, challenge: &PeerChallenge) -> EngineResult<()> {
        self.inner.insert_challenge(challenge).await
    }

    async fn get_challenge(&self, challenge_id: &str) -> EngineResult<Option<PeerChallenge>> {
        self.inner.get_challenge(challenge_id).await
    }

    async fn get_leaderboard_row(
        &self,
        challenge_id: &str,
        participant_id: &str,
    ) -> EngineResult<Option<LeaderboardRow>> {
        self.inner.get_leaderboard_row(challenge_id, participant_id).await
    }

    async fn put_leaderboard_row(
        &self,
        row: &LeaderboardRow,
        expected_version: Option<u32>,
    ) -> EngineResult<LeaderboardRow> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            // The rival's attempt lands between this writer's read and
            // write.
            let mut rival = row.clone();
            rival.best_score = 60;
            rival.best_time_seconds = Some(200);
            rival.attempt_count = 1;
            rival.version = 0;
            self.inner.put_leaderboard_row(&rival, None).await?;
            return Err(EngineError::ConcurrentUpdateConflict {
                entity: "leaderboard_row",
                id: row.id.clone(),
            });
        }
        self.inner.put_leaderboard_row(row, expected_version).await
    }

    async fn challenge_rows(&self, challenge_id: &str) -> EngineResult<Vec<LeaderboardRow>> {
        self.inner.challenge_rows(challenge_id).await
    }

    async fn unlocked_achievement_ids(&self, learner_id: &str) -> EngineResult<HashSet<String>> {
        self.inner.unlocked_achievement_ids(learner_id).await
    }

    async fn insert_unlocked_if_absent(&self, unlock: &UnlockedAchievement) -> EngineResult<bool> {
        self.inner.insert_unlocked_if_absent(unlock).await
    }

    async fn insert_capsule(&self, capsule: &TimeCapsule) -> EngineResult<()> {
        self.inner.insert_capsule(capsule).await
    }

    async fn get_capsule(&self, capsule_id: &str) -> EngineResult<Option<TimeCapsule>> {
        self.inner.get_capsule(capsule_id).await
    }

    async fn active_capsules_due(&self, now: DateTime<Utc>) -> EngineResult<Vec<TimeCapsule>> {
        self.inner.active_capsules_due(now).await
    }

    async fn reflect_capsule(
        &self,
        capsule_id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<bool> {
        self.inner.reflect_capsule(capsule_id, text, at).await
    }
}

#[tokio::test]
async fn a_lost_row_race_is_remerged_from_a_fresh_read() {
    let store = Arc::new(RacingRowStore::new());
    store.insert_learner(&Learner::new("rival")).await.unwrap();
    let service = ChallengeService::new(store.clone());

    let challenge = test_challenge("ch-1", "creator", 10);
    service.create_challenge(&challenge).await.unwrap();

    // 9/10 -> score 90. The first row write loses to an interleaved 60-point
    // attempt; the merge must pick up that row and still count this attempt.
    let outcome = service
        .submit_attempt_at("ch-1", "rival", &answers_with_correct(9, 10), Some(150), at(2026, 4, 4, 9))
        .await
        .unwrap();

    assert_eq!(outcome.row.attempt_count, 2);
    assert_eq!(outcome.row.best_score, 90);
    assert_eq!(outcome.row.best_time_seconds, Some(150));
    assert_eq!(outcome.row.version, 1);

    // The quiz side of the attempt was applied exactly once: curriculum
    // 90 -> 180 xp plus first-steps 50, high-achiever 50, quiz-master 75.
    let learner = store.get_learner("rival").await.unwrap().unwrap();
    assert_eq!(learner.experience, 355);
    assert_eq!(learner.version, 1);
    assert_eq!(store.count_attempts("rival").await.unwrap(), 1);
}
