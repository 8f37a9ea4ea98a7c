use std::sync::Arc;

use mongodb::bson::doc;
use mongodb::Client as MongoClient;

use crate::config::Config;
use crate::store::{MongoStore, ProgressStore};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProgressStore>,
}

impl AppState {
    pub async fn new(config: Config, mongo_client: MongoClient) -> anyhow::Result<Self> {
        let db = mongo_client.database(&config.mongo_database);

        tracing::info!("Pinging MongoDB...");
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            db.run_command(doc! { "ping": 1 }),
        )
        .await
        .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;
        tracing::info!("MongoDB connection established successfully");

        let store: Arc<dyn ProgressStore> = Arc::new(MongoStore::new(db));

        Ok(Self { config, store })
    }
}

pub mod capsule_service;
pub mod challenge_service;
pub mod quiz_generation;
pub mod submission_service;
