//! covid-fhir-server library crate
//!
//! Exposes `build_app`, `config` and `storage` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod config;
mod error;
mod middleware;
mod routes;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_mw,
    routing::get,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use storage::ConversionStore;

pub use middleware::REQUEST_ID_HEADER;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Where the last reverse conversion is kept
    pub store: Arc<dyn ConversionStore>,
    /// Default flat dataset
    pub dataset_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn ConversionStore>, dataset_path: PathBuf) -> Self {
        Self {
            store,
            dataset_path: Arc::new(dataset_path),
        }
    }
}

/// Build the CORS layer. Credentials are allowed, so methods, headers and a
/// `*` origin are mirrored from the request instead of sent as wildcards.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    // Install Prometheus metrics recorder.
    // Use build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // silently ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let public_routes = Router::new()
        .route("/", get(routes::dataset::root))
        .route("/get-file", get(routes::dataset::get_file))
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    let converter_routes = Router::new()
        .nest("/converter", routes::converter_routes())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    Router::new()
        .merge(public_routes)
        .merge(converter_routes)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
