pub mod admin;
pub mod assets;
pub mod credits;
pub mod generation;
pub mod jobs;
pub mod projects;
pub mod storage_utils;
