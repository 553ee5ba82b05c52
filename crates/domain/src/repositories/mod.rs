pub mod assets;
pub mod credits;
pub mod generation_jobs;
pub mod projects;
pub mod storage;
pub mod usage_counters;
