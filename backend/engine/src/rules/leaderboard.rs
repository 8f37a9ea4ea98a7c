use chrono::{DateTime, Utc};

use crate::models::LeaderboardRow;

/// Merge one peer-challenge attempt into the participant's leaderboard row.
///
/// The attempt count always grows by one. Best score and its associated
/// time are overwritten only on a strictly greater score, so a tie keeps
/// the time of the earliest attempt that achieved the current best. Pure;
/// the store layer persists the result under a version check so concurrent
/// attempts by the same participant cannot lose updates.
pub fn merge_attempt(
    existing: Option<&LeaderboardRow>,
    challenge_id: &str,
    participant_id: &str,
    score: u8,
    elapsed_seconds: Option<u32>,
    now: DateTime<Utc>,
) -> LeaderboardRow {
    match existing {
        None => LeaderboardRow {
            id: LeaderboardRow::row_id(challenge_id, participant_id),
            challenge_id: challenge_id.to_string(),
            participant_id: participant_id.to_string(),
            best_score: score,
            best_time_seconds: elapsed_seconds,
            attempt_count: 1,
            last_attempt_at: now,
            version: 0,
        },
        Some(row) => {
            let mut next = row.clone();
            next.attempt_count += 1;
            next.last_attempt_at = now;
            if score > row.best_score {
                next.best_score = score;
                next.best_time_seconds = elapsed_seconds;
            }
            next
        }
    }
}
