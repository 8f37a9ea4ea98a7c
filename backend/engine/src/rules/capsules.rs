use chrono::{DateTime, Utc};

use crate::models::{CapsuleStatus, TimeCapsule};

/// A capsule is due once its reflection date has passed and it is still
/// active. Identifying candidates never transitions state; that happens
/// only when the learner supplies reflection text.
pub fn is_due(capsule: &TimeCapsule, now: DateTime<Utc>) -> bool {
    capsule.status == CapsuleStatus::Active && capsule.reflection_date <= now
}

pub fn due_capsules(capsules: &[TimeCapsule], now: DateTime<Utc>) -> Vec<&TimeCapsule> {
    capsules.iter().filter(|c| is_due(c, now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn capsule(id: &str, status: CapsuleStatus, due_in: Duration) -> TimeCapsule {
        let now = Utc::now();
        TimeCapsule {
            id: id.to_string(),
            learner_id: "learner-1".to_string(),
            prompt: "revisit photosynthesis".to_string(),
            created_at: now - Duration::days(30),
            reflection_date: now + due_in,
            status,
            reflection_text: None,
            reflected_at: None,
        }
    }

    #[test]
    fn only_active_capsules_past_their_date_are_due() {
        let now = Utc::now();
        let capsules = vec![
            capsule("past-active", CapsuleStatus::Active, Duration::days(-1)),
            capsule("future-active", CapsuleStatus::Active, Duration::days(1)),
            capsule("past-reflected", CapsuleStatus::Reflected, Duration::days(-1)),
        ];

        let due = due_capsules(&capsules, now);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "past-active");
    }

    #[test]
    fn exactly_at_the_reflection_date_counts_as_due() {
        let c = capsule("at-boundary", CapsuleStatus::Active, Duration::zero());
        assert!(is_due(&c, c.reflection_date));
    }
}
