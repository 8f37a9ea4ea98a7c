use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Difficulty, Question, QuestionType, Quiz};
use crate::rules::difficulty;
use crate::store::ProgressStore;

/// How many recent scores feed the adaptive difficulty choice.
const RECENT_SCORE_WINDOW: usize = 5;

#[derive(Debug, Serialize)]
struct GenerateQuizRequest {
    subject: String,
    difficulty: Difficulty,
    question_type: QuestionType,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateQuizResponse {
    title: Option<String>,
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    prompt: String,
    expected_answer: String,
    options: Option<Vec<String>>,
    explanation: Option<String>,
    points: Option<u32>,
}

/// Client for the opaque content-generation service. Assumes nothing of the
/// response beyond ordered questions carrying an expected answer; the
/// service is slow and can fail, and both surface as `EngineError` for the
/// caller to handle.
pub struct QuizGenerationService {
    store: Arc<dyn ProgressStore>,
    http_client: Client,
    content_api_url: String,
}

impl QuizGenerationService {
    pub fn new(store: Arc<dyn ProgressStore>, content_api_url: String) -> Self {
        Self {
            store,
            http_client: Client::new(),
            content_api_url,
        }
    }

    /// Pick the next quiz's difficulty from the learner's recent scores for
    /// the subject. A learner with no history gets the explicit Medium
    /// default here, never through the selector itself.
    pub async fn adaptive_difficulty(
        &self,
        learner_id: &str,
        subject: &str,
    ) -> EngineResult<Difficulty> {
        let scores = self
            .store
            .recent_scores(learner_id, subject, RECENT_SCORE_WINDOW)
            .await?;
        if scores.is_empty() {
            tracing::debug!(
                "No score history for learner={}, subject={}; defaulting to medium",
                learner_id,
                subject
            );
            return Ok(Difficulty::Medium);
        }
        difficulty::select(&scores)
    }

    pub async fn generate_adaptive_quiz(
        &self,
        learner_id: &str,
        subject: &str,
        question_type: QuestionType,
        count: u32,
    ) -> EngineResult<Quiz> {
        let difficulty = self.adaptive_difficulty(learner_id, subject).await?;
        self.generate_quiz(subject, difficulty, question_type, count)
            .await
    }

    pub async fn generate_quiz(
        &self,
        subject: &str,
        difficulty: Difficulty,
        question_type: QuestionType,
        count: u32,
    ) -> EngineResult<Quiz> {
        let url = format!("{}/internal/generate_quiz", self.content_api_url);
        let payload = GenerateQuizRequest {
            subject: subject.to_string(),
            difficulty,
            question_type,
            count,
        };

        tracing::debug!(
            "Calling content-generation API: {} with subject={}, difficulty={}, count={}",
            url,
            subject,
            difficulty.as_str(),
            count
        );

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EngineError::ContentRejected { status, body });
        }

        let generated: GenerateQuizResponse = response.json().await?;

        tracing::info!(
            "Generated quiz for subject={}: {} questions at {}",
            subject,
            generated.questions.len(),
            difficulty.as_str()
        );

        Ok(Quiz {
            title: generated
                .title
                .unwrap_or_else(|| format!("{} quiz", subject)),
            subject: subject.to_string(),
            difficulty,
            question_type,
            questions: generated
                .questions
                .into_iter()
                .map(|q| Question {
                    prompt: q.prompt,
                    expected_answer: q.expected_answer,
                    options: q.options,
                    explanation: q.explanation,
                    points: q.points.unwrap_or(1),
                })
                .collect(),
        })
    }
}
