use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub content_api_url: String,
    pub sweep_interval_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            // Fallback to current directory .env for backward compatibility
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: MONGO_URI must be set in production!");
                }
                eprintln!("WARNING: Using default local MongoDB URI (dev mode only!)");
                "mongodb://localhost:27017".to_string()
            });

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "studyquest".to_string());

        let content_api_url = settings
            .get_string("content_api.url")
            .or_else(|_| env::var("CONTENT_API_URL"))
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let sweep_interval_seconds = settings
            .get_int("worker.sweep_interval_seconds")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| {
                env::var("SWEEP_INTERVAL_SECONDS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(300);

        Ok(Config {
            mongo_uri,
            mongo_database,
            content_api_url,
            sweep_interval_seconds,
        })
    }
}
