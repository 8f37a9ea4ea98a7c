//! Pure grading and progression rules. No I/O here; the services layer
//! reads snapshots, runs these functions and persists the results with
//! versioned compare-and-swap writes.

pub mod achievements;
pub mod capsules;
pub mod difficulty;
pub mod leaderboard;
pub mod ledger;
pub mod matcher;
pub mod rewards;
pub mod scorer;
pub mod streaks;
