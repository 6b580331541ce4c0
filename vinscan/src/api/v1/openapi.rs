use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::models;

use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VinScan API",
        version = "1.0.0",
        description = "VIN acquisition pipeline. OCR-based VIN extraction, ISO 3779 validation, and NHTSA registry decoding.",
    ),
    paths(
        handlers::health::health_check,
        handlers::scan::scan_image,
        handlers::scan::decode_vin,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Scan pipeline
        handlers::scan::DecodeVinRequest,
        models::NhtsaDecode,
        models::VehicleInfo,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::OcrStatus,
        handlers::health::RegistryStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "scans", description = "Image scans through the full VIN pipeline"),
        (name = "vins", description = "Manual VIN validation and decoding"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
