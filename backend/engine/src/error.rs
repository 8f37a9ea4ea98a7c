use thiserror::Error;

/// Error taxonomy for the progress & gamification engine.
///
/// Learner input is never an error: malformed or missing answers fall
/// through the lenient matcher and default to incorrect. Errors are raised
/// only for caller misuse (empty collections, unknown ids) and for storage
/// failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("quiz has no questions")]
    InvalidQuiz,

    #[error("score window is empty")]
    InvalidWindow,

    #[error("learner {0} not found")]
    UnknownLearner(String),

    #[error("challenge {0} not found")]
    UnknownChallenge(String),

    #[error("time capsule {0} not found")]
    UnknownCapsule(String),

    #[error("time capsule {0} is not yet due for reflection")]
    CapsuleNotDue(String),

    /// An optimistic-concurrency check failed on a versioned write. The
    /// caller must retry with a fresh read, not ignore this.
    #[error("concurrent update conflict on {entity} {id}")]
    ConcurrentUpdateConflict { entity: &'static str, id: String },

    #[error("storage error: {0}")]
    Storage(#[from] mongodb::error::Error),

    #[error("content generation request failed: {0}")]
    ContentApi(#[from] reqwest::Error),

    #[error("content generation service returned {status}: {body}")]
    ContentRejected { status: u16, body: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
