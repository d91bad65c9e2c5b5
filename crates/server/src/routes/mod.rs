pub mod converter;
pub mod dataset;
pub mod health;
pub mod metrics;

use axum::{Router, routing::post};

use crate::AppState;

/// Build conversion routes
pub fn converter_routes() -> Router<AppState> {
    Router::new()
        .route("/convert-to-fhir", post(converter::convert_to_fhir))
        .route("/convert-from-fhir", post(converter::convert_from_fhir))
        .route("/convert-from-fhir-local", post(converter::convert_local))
}
