use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, register_int_gauge, IntCounterVec, IntGauge};

lazy_static! {
    // Business Metrics
    pub static ref ATTEMPTS_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_attempts_recorded_total",
        "Total number of quiz attempts recorded",
        &["policy"]
    )
    .unwrap();

    pub static ref ACHIEVEMENTS_UNLOCKED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "achievements_unlocked_total",
        "Total number of achievements unlocked",
        &["achievement"]
    )
    .unwrap();

    pub static ref LEADERBOARD_MERGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "leaderboard_merges_total",
        "Total number of leaderboard row merges",
        &["outcome"]
    )
    .unwrap();

    // Concurrency Metrics
    pub static ref UPDATE_CONFLICTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "update_conflicts_total",
        "Total number of optimistic-concurrency write conflicts",
        &["entity"]
    )
    .unwrap();

    // Reflection Worker Metrics
    pub static ref CAPSULE_SWEEPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "capsule_sweeps_total",
        "Total number of time-capsule sweep ticks",
        &["status"]
    )
    .unwrap();

    pub static ref CAPSULES_DUE: IntGauge = register_int_gauge!(
        "capsules_due",
        "Number of time capsules currently due for reflection"
    )
    .unwrap();
}
