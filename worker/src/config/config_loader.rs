use anyhow::Result;
use backend::config::config_loader;

use super::config_model::{WorkerConfig, WorkerSettings};

pub fn load() -> Result<WorkerConfig> {
    dotenvy::dotenv().ok();

    let worker = WorkerSettings {
        poll_interval_secs: std::env::var("WORKER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?,
    };

    Ok(WorkerConfig {
        worker,
        database: config_loader::load_database()?,
        storage: config_loader::load_storage()?,
        image_api: config_loader::load_image_api()?,
        generation: config_loader::load_generation()?,
    })
}
