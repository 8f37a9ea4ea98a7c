use crate::error::{EngineError, EngineResult};
use crate::models::Difficulty;

/// Choose the next quiz's difficulty from the arithmetic mean of the
/// learner's most recent scores: below 60 easy, below 80 medium, otherwise
/// hard. An empty window is a caller bug (`InvalidWindow`); callers wanting
/// a fixed default for fresh learners must apply it explicitly, not through
/// this selector.
pub fn select(recent_scores: &[u8]) -> EngineResult<Difficulty> {
    if recent_scores.is_empty() {
        return Err(EngineError::InvalidWindow);
    }

    let mean = recent_scores.iter().map(|s| f64::from(*s)).sum::<f64>()
        / recent_scores.len() as f64;

    Ok(if mean < 60.0 {
        Difficulty::Easy
    } else if mean < 80.0 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(select(&[10, 50, 90]).unwrap(), Difficulty::Easy); // mean 50
        assert_eq!(select(&[60]).unwrap(), Difficulty::Medium);
        assert_eq!(select(&[79]).unwrap(), Difficulty::Medium);
        assert_eq!(select(&[80]).unwrap(), Difficulty::Hard);
        assert_eq!(select(&[100, 70]).unwrap(), Difficulty::Hard); // mean 85
    }

    #[test]
    fn boundary_just_below_sixty_is_easy() {
        assert_eq!(select(&[59, 60]).unwrap(), Difficulty::Easy); // mean 59.5
    }

    #[test]
    fn empty_window_is_rejected() {
        assert!(matches!(select(&[]), Err(EngineError::InvalidWindow)));
    }
}
