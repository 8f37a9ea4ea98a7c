use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{CapsuleStatus, TimeCapsule};
use crate::rules::capsules;
use crate::store::ProgressStore;

/// Time-capsule lifecycle. The sweep only identifies due capsules; the
/// `Active -> Reflected` transition happens exclusively through
/// `submit_reflection`, when the learner supplies their text.
pub struct CapsuleService {
    store: Arc<dyn ProgressStore>,
}

impl CapsuleService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    pub async fn create_capsule(
        &self,
        learner_id: &str,
        prompt: &str,
        reflection_date: DateTime<Utc>,
    ) -> EngineResult<TimeCapsule> {
        let capsule = TimeCapsule {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            prompt: prompt.to_string(),
            created_at: Utc::now(),
            reflection_date,
            status: CapsuleStatus::Active,
            reflection_text: None,
            reflected_at: None,
        };
        self.store.insert_capsule(&capsule).await?;
        tracing::info!(
            "Time capsule created: id={}, learner={}, due={}",
            capsule.id,
            learner_id,
            reflection_date
        );
        Ok(capsule)
    }

    pub async fn due_capsules(&self, now: DateTime<Utc>) -> EngineResult<Vec<TimeCapsule>> {
        let candidates = self.store.active_capsules_due(now).await?;
        // The store query already filters; re-apply the rule so a stale
        // index or a lagging secondary cannot surface a non-due capsule.
        Ok(candidates
            .into_iter()
            .filter(|c| capsules::is_due(c, now))
            .collect())
    }

    pub async fn submit_reflection(
        &self,
        capsule_id: &str,
        text: &str,
    ) -> EngineResult<TimeCapsule> {
        self.submit_reflection_at(capsule_id, text, Utc::now()).await
    }

    pub async fn submit_reflection_at(
        &self,
        capsule_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<TimeCapsule> {
        let capsule = self
            .store
            .get_capsule(capsule_id)
            .await?
            .ok_or_else(|| EngineError::UnknownCapsule(capsule_id.to_string()))?;

        if capsule.status == CapsuleStatus::Active && !capsules::is_due(&capsule, now) {
            return Err(EngineError::CapsuleNotDue(capsule_id.to_string()));
        }

        // Status CAS: a capsule that is no longer active (already reflected,
        // possibly by a concurrent submission) fails here.
        if !self.store.reflect_capsule(capsule_id, text, now).await? {
            return Err(EngineError::ConcurrentUpdateConflict {
                entity: "time_capsule",
                id: capsule_id.to_string(),
            });
        }

        tracing::info!("Time capsule reflected: id={}", capsule_id);
        self.store
            .get_capsule(capsule_id)
            .await?
            .ok_or_else(|| EngineError::UnknownCapsule(capsule_id.to_string()))
    }
}
