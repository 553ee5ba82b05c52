use backend::config::config_model::{Database, Generation, ImageApi, StorageSettings};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub worker: WorkerSettings,
    pub database: Database,
    pub storage: StorageSettings,
    pub image_api: ImageApi,
    pub generation: Generation,
}

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub poll_interval_secs: u64,
}
