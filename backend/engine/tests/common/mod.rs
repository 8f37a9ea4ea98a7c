#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use studyquest_engine::models::{
    Difficulty, Learner, PeerChallenge, Question, QuestionType, Quiz,
};
use studyquest_engine::store::{MemoryStore, ProgressStore};

pub async fn seeded_store(learner_id: &str) -> Arc<MemoryStore> {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let store = Arc::new(MemoryStore::new());
    store
        .insert_learner(&Learner::new(learner_id))
        .await
        .expect("Failed to seed test learner");
    store
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn choice_question(expected: &str) -> Question {
    Question {
        prompt: "Pick the right option".to_string(),
        expected_answer: expected.to_string(),
        options: Some(vec![
            "0".to_string(),
            "1".to_string(),
            "2".to_string(),
            "3".to_string(),
        ]),
        explanation: None,
        points: 1,
    }
}

/// A multiple-choice quiz whose every question expects answer "1".
pub fn choice_quiz(total: usize) -> Quiz {
    Quiz {
        title: "Test quiz".to_string(),
        subject: "biology".to_string(),
        difficulty: Difficulty::Medium,
        question_type: QuestionType::MultipleChoice,
        questions: (0..total).map(|_| choice_question("1")).collect(),
    }
}

/// Answers for `choice_quiz`: the first `correct` are right, the rest wrong.
pub fn answers_with_correct(correct: usize, total: usize) -> Vec<Option<String>> {
    (0..total)
        .map(|i| Some(if i < correct { "1" } else { "0" }.to_string()))
        .collect()
}

pub fn test_challenge(id: &str, creator_id: &str, total: usize) -> PeerChallenge {
    PeerChallenge {
        id: id.to_string(),
        title: "Head to head".to_string(),
        creator_id: creator_id.to_string(),
        subject: "biology".to_string(),
        difficulty: Difficulty::Medium,
        question_type: QuestionType::MultipleChoice,
        questions: (0..total).map(|_| choice_question("1")).collect(),
        time_limit_seconds: 300,
        max_attempts: 10,
        created_at: Utc::now(),
    }
}
