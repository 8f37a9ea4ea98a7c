use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::{Collection, Database};

use crate::error::{EngineError, EngineResult};
use crate::metrics::UPDATE_CONFLICTS_TOTAL;
use crate::models::{
    ChatInteraction, FocusSession, LeaderboardRow, Learner, PeerChallenge, QuizAttempt,
    TimeCapsule, UnlockedAchievement,
};

use super::ProgressStore;

/// MongoDB-backed store. Versioned records (learners, leaderboard rows) are
/// written with `find_one_and_replace` filtered on the expected version, so
/// interleaved read-modify-write cycles fail instead of losing updates.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn learners(&self) -> Collection<Learner> {
        self.db.collection("learners")
    }

    fn attempts(&self) -> Collection<QuizAttempt> {
        self.db.collection("quiz_attempts")
    }

    fn focus_sessions(&self) -> Collection<FocusSession> {
        self.db.collection("focus_sessions")
    }

    fn chat_interactions(&self) -> Collection<ChatInteraction> {
        self.db.collection("chat_interactions")
    }

    fn challenges(&self) -> Collection<PeerChallenge> {
        self.db.collection("peer_challenges")
    }

    fn leaderboard(&self) -> Collection<LeaderboardRow> {
        self.db.collection("leaderboard_rows")
    }

    fn unlocked(&self) -> Collection<UnlockedAchievement> {
        self.db.collection("unlocked_achievements")
    }

    fn capsules(&self) -> Collection<TimeCapsule> {
        self.db.collection("time_capsules")
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(ref we)) =
        *err.kind
    {
        we.code == 11000
    } else {
        false
    }
}

#[async_trait]
impl ProgressStore for MongoStore {
    async fn get_learner(&self, learner_id: &str) -> EngineResult<Option<Learner>> {
        Ok(self.learners().find_one(doc! { "_id": learner_id }).await?)
    }

    async fn insert_learner(&self, learner: &Learner) -> EngineResult<()> {
        self.learners().insert_one(learner).await?;
        Ok(())
    }

    async fn put_learner(&self, learner: &Learner, expected_version: u32) -> EngineResult<Learner> {
        let mut next = learner.clone();
        next.version = expected_version + 1;

        let filter = doc! { "_id": &learner.id, "version": expected_version as i64 };
        let replaced = self.learners().find_one_and_replace(filter, &next).await?;

        if replaced.is_some() {
            return Ok(next);
        }

        // Distinguish a missing learner from a lost version race.
        if self.get_learner(&learner.id).await?.is_none() {
            return Err(EngineError::UnknownLearner(learner.id.clone()));
        }
        UPDATE_CONFLICTS_TOTAL.with_label_values(&["learner"]).inc();
        tracing::warn!(
            "Version conflict writing learner {} (expected v{})",
            learner.id,
            expected_version
        );
        Err(EngineError::ConcurrentUpdateConflict {
            entity: "learner",
            id: learner.id.clone(),
        })
    }

    async fn append_attempt(&self, attempt: &QuizAttempt) -> EngineResult<()> {
        self.attempts().insert_one(attempt).await?;
        Ok(())
    }

    async fn count_attempts(&self, learner_id: &str) -> EngineResult<u64> {
        Ok(self
            .attempts()
            .count_documents(doc! { "learner_id": learner_id })
            .await?)
    }

    async fn recent_scores(
        &self,
        learner_id: &str,
        subject: &str,
        limit: usize,
    ) -> EngineResult<Vec<u8>> {
        let cursor = self
            .attempts()
            .find(doc! { "learner_id": learner_id, "subject": subject })
            .sort(doc! { "submitted_at": -1 })
            .limit(limit as i64)
            .await?;
        let attempts: Vec<QuizAttempt> = cursor.try_collect().await?;
        Ok(attempts.into_iter().map(|a| a.score).collect())
    }

    async fn record_focus_session(&self, session: &FocusSession) -> EngineResult<()> {
        self.focus_sessions().insert_one(session).await?;
        Ok(())
    }

    async fn record_chat_interaction(&self, interaction: &ChatInteraction) -> EngineResult<()> {
        self.chat_interactions().insert_one(interaction).await?;
        Ok(())
    }

    async fn count_chat_interactions(&self, learner_id: &str) -> EngineResult<u64> {
        Ok(self
            .chat_interactions()
            .count_documents(doc! { "learner_id": learner_id })
            .await?)
    }

    async fn has_qualifying_activity(
        &self,
        learner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<bool> {
        let window = doc! {
            "$gte": BsonDateTime::from_chrono(start),
            "$lt": BsonDateTime::from_chrono(end),
        };

        let attempt = self
            .attempts()
            .find_one(doc! { "learner_id": learner_id, "submitted_at": window.clone() })
            .await?;
        if attempt.is_some() {
            return Ok(true);
        }

        let session = self
            .focus_sessions()
            .find_one(doc! {
                "learner_id": learner_id,
                "completed": true,
                "ended_at": window,
            })
            .await?;
        Ok(session.is_some())
    }

    async fn insert_challenge(&self, challenge: &PeerChallenge) -> EngineResult<()> {
        self.challenges().insert_one(challenge).await?;
        Ok(())
    }

    async fn get_challenge(&self, challenge_id: &str) -> EngineResult<Option<PeerChallenge>> {
        Ok(self
            .challenges()
            .find_one(doc! { "_id": challenge_id })
            .await?)
    }

    async fn get_leaderboard_row(
        &self,
        challenge_id: &str,
        participant_id: &str,
    ) -> EngineResult<Option<LeaderboardRow>> {
        let id = LeaderboardRow::row_id(challenge_id, participant_id);
        Ok(self.leaderboard().find_one(doc! { "_id": id }).await?)
    }

    async fn put_leaderboard_row(
        &self,
        row: &LeaderboardRow,
        expected_version: Option<u32>,
    ) -> EngineResult<LeaderboardRow> {
        match expected_version {
            None => {
                // Fresh row; a duplicate key means another attempt won the
                // insert race and the caller must re-read and merge again.
                match self.leaderboard().insert_one(row).await {
                    Ok(_) => Ok(row.clone()),
                    Err(e) if is_duplicate_key(&e) => {
                        UPDATE_CONFLICTS_TOTAL
                            .with_label_values(&["leaderboard_row"])
                            .inc();
                        Err(EngineError::ConcurrentUpdateConflict {
                            entity: "leaderboard_row",
                            id: row.id.clone(),
                        })
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Some(version) => {
                let mut next = row.clone();
                next.version = version + 1;

                let filter = doc! { "_id": &row.id, "version": version as i64 };
                let replaced = self.leaderboard().find_one_and_replace(filter, &next).await?;
                if replaced.is_some() {
                    Ok(next)
                } else {
                    UPDATE_CONFLICTS_TOTAL
                        .with_label_values(&["leaderboard_row"])
                        .inc();
                    Err(EngineError::ConcurrentUpdateConflict {
                        entity: "leaderboard_row",
                        id: row.id.clone(),
                    })
                }
            }
        }
    }

    async fn challenge_rows(&self, challenge_id: &str) -> EngineResult<Vec<LeaderboardRow>> {
        let cursor = self
            .leaderboard()
            .find(doc! { "challenge_id": challenge_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn unlocked_achievement_ids(&self, learner_id: &str) -> EngineResult<HashSet<String>> {
        let cursor = self
            .unlocked()
            .find(doc! { "learner_id": learner_id })
            .await?;
        let unlocks: Vec<UnlockedAchievement> = cursor.try_collect().await?;
        Ok(unlocks.into_iter().map(|u| u.achievement_id).collect())
    }

    async fn insert_unlocked_if_absent(&self, unlock: &UnlockedAchievement) -> EngineResult<bool> {
        match self.unlocked().insert_one(unlock).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_capsule(&self, capsule: &TimeCapsule) -> EngineResult<()> {
        self.capsules().insert_one(capsule).await?;
        Ok(())
    }

    async fn get_capsule(&self, capsule_id: &str) -> EngineResult<Option<TimeCapsule>> {
        Ok(self.capsules().find_one(doc! { "_id": capsule_id }).await?)
    }

    async fn active_capsules_due(&self, now: DateTime<Utc>) -> EngineResult<Vec<TimeCapsule>> {
        let cursor = self
            .capsules()
            .find(doc! {
                "status": "active",
                "reflection_date": { "$lte": BsonDateTime::from_chrono(now) },
            })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn reflect_capsule(
        &self,
        capsule_id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<bool> {
        let updated = self
            .capsules()
            .find_one_and_update(
                doc! { "_id": capsule_id, "status": "active" },
                doc! { "$set": {
                    "status": "reflected",
                    "reflection_text": text,
                    "reflected_at": BsonDateTime::from_chrono(at),
                }},
            )
            .await?;
        Ok(updated.is_some())
    }
}
