use tracing_subscriber::fmt::init;

use studyquest_engine::{
    config::Config,
    metrics::{CAPSULES_DUE, CAPSULE_SWEEPS_TOTAL},
    services::{capsule_service::CapsuleService, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::load().expect("Failed to load configuration");

    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to connect to MongoDB");

    let app_state = AppState::new(config.clone(), mongo_client)
        .await
        .expect("Failed to initialize app state");

    let service = CapsuleService::new(app_state.store.clone());
    let interval = std::time::Duration::from_secs(config.sweep_interval_seconds);

    tracing::info!(
        "Reflection worker started, sweeping every {}s",
        config.sweep_interval_seconds
    );

    loop {
        match service.due_capsules(chrono::Utc::now()).await {
            Ok(due) => {
                CAPSULES_DUE.set(due.len() as i64);
                CAPSULE_SWEEPS_TOTAL.with_label_values(&["ok"]).inc();
                for capsule in &due {
                    // Identification only; reflection happens when the
                    // learner submits their text.
                    tracing::info!(
                        "Time capsule due: id={}, learner={}, due_since={}",
                        capsule.id,
                        capsule.learner_id,
                        capsule.reflection_date
                    );
                }
            }
            Err(e) => {
                CAPSULE_SWEEPS_TOTAL.with_label_values(&["error"]).inc();
                tracing::error!("Capsule sweep failed: {}", e);
            }
        }

        tokio::time::sleep(interval).await;
    }
}
