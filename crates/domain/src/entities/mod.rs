pub mod assets;
pub mod credit_accounts;
pub mod generation_jobs;
pub mod projects;
pub mod usage_counters;
