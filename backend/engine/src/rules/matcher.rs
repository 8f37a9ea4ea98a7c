use crate::models::{Question, QuestionType};

/// Decide whether a submitted answer is correct for one question.
///
/// Choice-based types require an exact match after case-folding and
/// trimming. Open-answer types accept case-folded, trimmed substring
/// containment in either direction. That containment rule is a deliberately
/// lenient heuristic, not semantic grading; partially-overlapping wrong
/// answers can slip through.
///
/// An absent or empty submission is always incorrect. Never errors.
pub fn is_correct(question_type: QuestionType, question: &Question, submitted: Option<&str>) -> bool {
    let submitted = match submitted {
        Some(s) => s.trim().to_lowercase(),
        None => return false,
    };
    if submitted.is_empty() {
        return false;
    }

    let expected = question.expected_answer.trim().to_lowercase();
    // An empty canonical answer would make the containment rule accept
    // anything, so reject it outright.
    if expected.is_empty() {
        return false;
    }

    if question_type.is_choice_based() {
        submitted == expected
    } else {
        submitted.contains(&expected) || expected.contains(&submitted)
    }
}
