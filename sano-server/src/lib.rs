//! sano-server library - HTTP routing over the variant ingestion core
//!
//! Handlers receive the store through axum state; nothing is global.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sano_common::VariantStore;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Variant store, which also owns the identity registry
    pub store: VariantStore,
}

impl AppState {
    /// Create new application state
    pub fn new(store: VariantStore) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route(
            "/individuals",
            get(api::list_individuals).post(api::create_individual),
        )
        .route(
            "/individuals/:individual/genetic-data",
            get(api::get_genetic_data).post(api::upload_genetic_data),
        )
        .route(
            "/individuals/:individual/genetic_data",
            post(api::upload_genetic_data),
        )
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
