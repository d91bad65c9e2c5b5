//! Conversion endpoints under `/converter`

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    response::IntoResponse,
};
use covid_fhir_core::{Bundle, CovidRecord, bundle_to_records, records_to_bundle};

use crate::AppState;
use crate::error::AppError;

/// Multipart field carrying the uploaded JSON document
pub const UPLOAD_FIELD: &str = "file";

/// Read the `file` field of a multipart upload
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?);
        }
    }
    Err(AppError::BadRequest(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

/// POST /converter/convert-to-fhir - Convert an uploaded flat dataset to a Bundle
pub async fn convert_to_fhir(multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let upload = read_upload(multipart).await?;
    let records = CovidRecord::list_from_slice(&upload)?;
    let bundle = records_to_bundle(&records)?;

    tracing::info!(records = records.len(), "Converted flat records to FHIR");
    Ok(Json(bundle))
}

/// POST /converter/convert-from-fhir - Convert an uploaded Bundle to flat records
///
/// The result replaces the stored conversion, which `/get-file` then serves.
pub async fn convert_from_fhir(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = read_upload(multipart).await?;
    let bundle = Bundle::from_slice(&upload)?;
    let records = bundle_to_records(&bundle)?;

    state.store.replace(&records).await?;

    tracing::info!(entries = bundle.entry.len(), "Converted FHIR bundle to flat records");
    Ok(Json(records))
}

/// POST /converter/convert-from-fhir-local - Convert the bundled default dataset
pub async fn convert_local(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let path = state.dataset_path.as_path();
    let content = tokio::fs::read(path).await.map_err(|e| {
        AppError::NotFound(format!("Dataset {} unavailable: {}", path.display(), e))
    })?;

    let records = CovidRecord::list_from_slice(&content)?;
    let bundle = records_to_bundle(&records)?;

    tracing::info!(
        records = records.len(),
        dataset = %path.display(),
        "Converted local dataset to FHIR"
    );
    Ok(Json(bundle))
}
