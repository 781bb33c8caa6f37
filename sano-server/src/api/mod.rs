//! HTTP API handlers for sano-server

pub mod genetic_data;
pub mod health;
pub mod individuals;

pub use genetic_data::{get_genetic_data, upload_genetic_data};
pub use health::health_routes;
pub use individuals::{create_individual, list_individuals};
