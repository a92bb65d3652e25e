// Shared infrastructure
pub mod config;
pub mod error;
pub mod telemetry;

// Domain
pub mod relay;
pub mod telegram;

// Application layer
pub mod api;
pub mod server;
