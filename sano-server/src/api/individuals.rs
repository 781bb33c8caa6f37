//! Individual registry endpoints
//!
//! - GET /individuals: list registered individuals
//! - POST /individuals: register a new individual

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sano_common::Individual;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Request body for registering an individual
#[derive(Debug, Deserialize)]
pub struct NewIndividual {
    pub individual_id: String,
}

/// Registration confirmation
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

/// GET /individuals
///
/// Returns an empty array when nobody is registered.
pub async fn list_individuals(State(state): State<AppState>) -> ApiResult<Json<Vec<Individual>>> {
    let individuals = state.store.list_individuals().await?;
    Ok(Json(individuals.unwrap_or_default()))
}

/// POST /individuals
pub async fn create_individual(
    State(state): State<AppState>,
    Json(request): Json<NewIndividual>,
) -> ApiResult<Json<CreatedResponse>> {
    if request.individual_id.is_empty() {
        return Err(ApiError::BadRequest("individual_id must not be empty".to_string()));
    }

    let id = state.store.registry().register(&request.individual_id).await?;

    Ok(Json(CreatedResponse {
        message: format!("User {} created", request.individual_id),
        id: id.0,
    }))
}
