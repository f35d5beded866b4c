pub mod alerts;
pub mod config;
pub mod export;
pub mod subscription;
pub mod summary;
