pub mod config;
pub mod monitor;
pub mod service;
pub mod telemetry;
