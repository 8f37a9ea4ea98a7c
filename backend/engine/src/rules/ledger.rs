use crate::models::Learner;

use super::rewards::RewardDelta;

pub const EXPERIENCE_PER_LEVEL: u32 = 1000;

pub fn level_for_experience(experience: u32) -> u32 {
    experience / EXPERIENCE_PER_LEVEL + 1
}

/// Apply a reward delta to a learner snapshot. Pure: the caller persists the
/// result with a versioned compare-and-swap write. Deltas are unsigned, so
/// experience and coins can only grow and the derived level never drops.
pub fn apply(snapshot: &Learner, delta: RewardDelta) -> Learner {
    let mut next = snapshot.clone();
    next.experience = snapshot.experience + delta.experience;
    next.coins = snapshot.coins + delta.coins;
    next.level = level_for_experience(next.experience);
    next
}
