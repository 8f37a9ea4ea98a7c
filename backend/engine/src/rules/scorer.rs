use crate::error::{EngineError, EngineResult};
use crate::models::{Question, QuestionType};

use super::matcher;

/// Aggregated outcome of grading one quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    /// `round(100 * correct / total)`, always in `0..=100`.
    pub score: u8,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

/// Grade a full quiz. `answers` is aligned with question position; missing
/// trailing entries count as unanswered. An empty question list is a caller
/// bug and fails with `InvalidQuiz` rather than dividing by zero.
pub fn score_quiz(
    question_type: QuestionType,
    questions: &[Question],
    answers: &[Option<String>],
) -> EngineResult<QuizResult> {
    if questions.is_empty() {
        return Err(EngineError::InvalidQuiz);
    }

    let correct_count = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| {
            let submitted = answers.get(*i).and_then(|a| a.as_deref());
            matcher::is_correct(question_type, q, submitted)
        })
        .count() as u32;

    let total = questions.len() as u32;
    let score = ((100.0 * f64::from(correct_count)) / f64::from(total)).round() as u8;

    Ok(QuizResult {
        score,
        correct_count,
        incorrect_count: total - correct_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(expected: &str) -> Question {
        Question {
            prompt: "pick one".to_string(),
            expected_answer: expected.to_string(),
            options: Some(vec!["a".to_string(), "b".to_string()]),
            explanation: None,
            points: 1,
        }
    }

    #[test]
    fn ten_questions_seven_correct_scores_seventy() {
        let questions: Vec<Question> = (0..10).map(|_| mcq("1")).collect();
        let answers: Vec<Option<String>> = (0..10)
            .map(|i| Some(if i < 7 { "1" } else { "0" }.to_string()))
            .collect();

        let result = score_quiz(QuestionType::MultipleChoice, &questions, &answers).unwrap();
        assert_eq!(result.score, 70);
        assert_eq!(result.correct_count, 7);
        assert_eq!(result.incorrect_count, 3);
    }

    #[test]
    fn score_rounds_to_nearest_integer() {
        let questions: Vec<Question> = (0..3).map(|_| mcq("1")).collect();

        let one_right = vec![Some("1".to_string()), Some("0".to_string()), None];
        let result = score_quiz(QuestionType::MultipleChoice, &questions, &one_right).unwrap();
        assert_eq!(result.score, 33);

        let two_right = vec![Some("1".to_string()), Some("1".to_string()), None];
        let result = score_quiz(QuestionType::MultipleChoice, &questions, &two_right).unwrap();
        assert_eq!(result.score, 67);
    }

    #[test]
    fn missing_trailing_answers_count_as_unanswered() {
        let questions: Vec<Question> = (0..4).map(|_| mcq("1")).collect();
        let answers = vec![Some("1".to_string())];

        let result = score_quiz(QuestionType::MultipleChoice, &questions, &answers).unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.incorrect_count, 3);
        assert_eq!(result.score, 25);
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let result = score_quiz(QuestionType::MultipleChoice, &[], &[]);
        assert!(matches!(result, Err(EngineError::InvalidQuiz)));
    }
}
