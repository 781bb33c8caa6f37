//! Genetic data endpoints
//!
//! - GET /individuals/:individual/genetic-data?variants=rs123,rs456
//! - POST /individuals/:individual/genetic_data (multipart field `file`)

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sano_common::ingest::ingest_file;
use sano_common::VariantRecord;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Multipart field carrying the batch file
pub const FILE_FIELD: &str = "file";

/// Query parameters for genetic data retrieval
#[derive(Debug, Deserialize)]
pub struct GeneticDataQuery {
    /// Comma-separated variant ids
    pub variants: Option<String>,
}

impl GeneticDataQuery {
    /// Variant ids to filter on, `None` when no non-empty id was given
    pub fn variant_filter(&self) -> Option<Vec<String>> {
        let ids: Vec<String> = self
            .variants
            .as_deref()?
            .split(',')
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if ids.is_empty() {
            None
        } else {
            Some(ids)
        }
    }
}

/// Upload confirmation
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub records: usize,
}

/// GET /individuals/:individual/genetic-data
///
/// 404 when the individual is not registered. Record order is unspecified.
pub async fn get_genetic_data(
    State(state): State<AppState>,
    Path(individual): Path<String>,
    Query(query): Query<GeneticDataQuery>,
) -> ApiResult<Json<Vec<VariantRecord>>> {
    let filter = query.variant_filter();
    let records = state
        .store
        .query_records(&individual, filter.as_deref())
        .await?;

    debug!("Returning {} records for '{}'", records.len(), individual);
    Ok(Json(records))
}

/// POST /individuals/:individual/genetic_data
///
/// Decodes the uploaded batch file and stores all of its records, or none.
pub async fn upload_genetic_data(
    State(state): State<AppState>,
    Path(individual): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            file = Some(bytes);
            break;
        }
    }

    let bytes = file.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field '{}'", FILE_FIELD))
    })?;

    let records = ingest_file(&state.store, &bytes, &individual).await?;

    Ok(Json(UploadResponse {
        message: "Successfully uploaded data".to_string(),
        records,
    }))
}
