//! API layer - HTTP endpoint handlers.

mod health;
mod routes;

pub use health::{health, HealthResponse};
pub use routes::api_routes;
