pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use services::AppState;
