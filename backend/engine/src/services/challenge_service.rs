use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::metrics::LEADERBOARD_MERGES_TOTAL;
use crate::models::{LeaderboardRow, PeerChallenge, Quiz};
use crate::rules::leaderboard;
use crate::rules::rewards::RewardPolicy;
use crate::store::ProgressStore;

use super::submission_service::{SubmissionOutcome, SubmissionService};

/// Upper bound on re-reads when the leaderboard row write loses a race.
const MERGE_RETRY_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct ChallengeOutcome {
    pub submission: SubmissionOutcome,
    pub row: LeaderboardRow,
}

/// Peer-challenge attempts: grade against the challenge's question set,
/// reward under the curriculum policy through the normal submission
/// pipeline, then merge the leaderboard row idempotently.
pub struct ChallengeService {
    store: Arc<dyn ProgressStore>,
    submissions: SubmissionService,
}

impl ChallengeService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self {
            submissions: SubmissionService::new(store.clone()),
            store,
        }
    }

    pub async fn create_challenge(&self, challenge: &PeerChallenge) -> EngineResult<()> {
        self.store.insert_challenge(challenge).await?;
        tracing::info!(
            "Peer challenge created: id={}, creator={}, questions={}",
            challenge.id,
            challenge.creator_id,
            challenge.questions.len()
        );
        Ok(())
    }

    pub async fn submit_attempt(
        &self,
        challenge_id: &str,
        participant_id: &str,
        answers: &[Option<String>],
        elapsed_seconds: Option<u32>,
    ) -> EngineResult<ChallengeOutcome> {
        self.submit_attempt_at(challenge_id, participant_id, answers, elapsed_seconds, Utc::now())
            .await
    }

    /// The leaderboard write is one atomic read-modify-write per submission:
    /// the merged row is persisted under the version read beforehand, so
    /// concurrent attempts by the same participant conflict instead of
    /// losing an attempt count or a best score. A lost row race is retried
    /// here rather than surfaced, because the quiz side of the attempt has
    /// already been committed and resubmitting would grade and reward it a
    /// second time.
    pub async fn submit_attempt_at(
        &self,
        challenge_id: &str,
        participant_id: &str,
        answers: &[Option<String>],
        elapsed_seconds: Option<u32>,
        now: DateTime<Utc>,
    ) -> EngineResult<ChallengeOutcome> {
        let challenge = self
            .store
            .get_challenge(challenge_id)
            .await?
            .ok_or_else(|| EngineError::UnknownChallenge(challenge_id.to_string()))?;

        let quiz = Quiz {
            title: challenge.title.clone(),
            subject: challenge.subject.clone(),
            difficulty: challenge.difficulty,
            question_type: challenge.question_type,
            questions: challenge.questions.clone(),
        };
        let submission = self
            .submissions
            .submit_quiz_at(
                participant_id,
                &quiz,
                answers,
                elapsed_seconds,
                RewardPolicy::CurriculumQuiz,
                now,
            )
            .await?;

        let row = self
            .merge_into_leaderboard(
                challenge_id,
                participant_id,
                submission.result.score,
                elapsed_seconds,
                now,
            )
            .await?;

        tracing::info!(
            "Challenge attempt merged: challenge={}, participant={}, score={}, best={}, attempts={}",
            challenge_id,
            participant_id,
            submission.result.score,
            row.best_score,
            row.attempt_count
        );

        Ok(ChallengeOutcome { submission, row })
    }

    /// Read, merge, write under the version read. On a conflict (insert
    /// race or stale version) the same (score, time) is re-merged against a
    /// fresh read, so every submitted attempt lands in the count exactly
    /// once.
    async fn merge_into_leaderboard(
        &self,
        challenge_id: &str,
        participant_id: &str,
        score: u8,
        elapsed_seconds: Option<u32>,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaderboardRow> {
        let mut conflict = None;
        for _ in 0..MERGE_RETRY_LIMIT {
            let existing = self
                .store
                .get_leaderboard_row(challenge_id, participant_id)
                .await?;
            let expected_version = existing.as_ref().map(|r| r.version);
            let merged = leaderboard::merge_attempt(
                existing.as_ref(),
                challenge_id,
                participant_id,
                score,
                elapsed_seconds,
                now,
            );
            let improved = existing
                .as_ref()
                .is_none_or(|r| merged.best_score > r.best_score);

            match self.store.put_leaderboard_row(&merged, expected_version).await {
                Ok(row) => {
                    LEADERBOARD_MERGES_TOTAL
                        .with_label_values(&[if improved { "improved" } else { "kept" }])
                        .inc();
                    return Ok(row);
                }
                Err(e @ EngineError::ConcurrentUpdateConflict { .. }) => {
                    tracing::warn!(
                        "Leaderboard row race: challenge={}, participant={}; re-reading",
                        challenge_id,
                        participant_id
                    );
                    conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(conflict.unwrap_or(EngineError::ConcurrentUpdateConflict {
            entity: "leaderboard_row",
            id: LeaderboardRow::row_id(challenge_id, participant_id),
        }))
    }

    /// Rows ranked by best score descending, ties broken by best time
    /// ascending (rows without a recorded time sort last).
    pub async fn leaderboard(&self, challenge_id: &str) -> EngineResult<Vec<LeaderboardRow>> {
        let mut rows = self.store.challenge_rows(challenge_id).await?;
        rows.sort_by(|a, b| {
            b.best_score.cmp(&a.best_score).then_with(|| {
                a.best_time_seconds
                    .unwrap_or(u32::MAX)
                    .cmp(&b.best_time_seconds.unwrap_or(u32::MAX))
            })
        });
        Ok(rows)
    }
}
