pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
pub mod estimation;
pub mod gateway;
pub mod storage;
pub mod telemetry;
