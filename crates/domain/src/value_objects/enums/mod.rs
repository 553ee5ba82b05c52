pub mod asset_kinds;
pub mod counter_types;
pub mod generation_modes;
pub mod job_statuses;
