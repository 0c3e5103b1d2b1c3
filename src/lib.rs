pub mod client;
pub mod collectors;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod server;
