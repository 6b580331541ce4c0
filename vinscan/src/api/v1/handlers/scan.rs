use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::VinScanError;
use crate::models::VehicleInfo;
use crate::vin;

/// Upload cap for scan images.
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// `POST /api/v1/scans`
///
/// Accepts a multipart form with an `image` field, runs the full scan
/// pipeline (OCR, VIN extraction and validation, registry decode) and
/// returns the resulting `VehicleInfo`. Pipeline failures are reported in
/// the `error` field of the payload, not as HTTP errors.
#[utoipa::path(
    post,
    path = "/api/v1/scans",
    tag = "scans",
    operation_id = "scans.create",
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload with an `image` field"),
    responses(
        (status = 200, description = "Scan pipeline result", body = VehicleInfo),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn scan_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResponse<VehicleInfo> {
    let mut image_bytes: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();

        if name == "image" {
            let bytes = match field.bytes().await {
                Ok(b) => b,
                Err(e) => {
                    return ApiResponse::error(
                        ErrorCode::InvalidRequest,
                        format!("Failed to read image: {e}"),
                    );
                }
            };

            if bytes.len() > MAX_IMAGE_SIZE {
                return ApiResponse::error(
                    ErrorCode::InvalidRequest,
                    format!(
                        "Image too large: {} bytes (max {} bytes)",
                        bytes.len(),
                        MAX_IMAGE_SIZE
                    ),
                );
            }

            image_bytes = Some(bytes.to_vec());
        }
    }

    let Some(image) = image_bytes else {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Missing 'image' field");
    };
    if image.is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Image is empty");
    }

    ApiResponse::success(state.scan.process_vin_image(&image).await)
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DecodeVinRequest {
    pub vin: String,
}

/// `POST /api/v1/vins:decode`
///
/// Manual-entry decode: validates the submitted VIN's check digit and, when
/// it passes, returns the registry decode as a `VehicleInfo`.
#[utoipa::path(
    post,
    path = "/api/v1/vins:decode",
    tag = "vins",
    operation_id = "vins.decode",
    request_body = DecodeVinRequest,
    responses(
        (status = 200, description = "Registry decode result", body = VehicleInfo),
        (status = 400, description = "VIN failed validation", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn decode_vin(
    State(state): State<AppState>,
    Json(request): Json<DecodeVinRequest>,
) -> ApiResponse<VehicleInfo> {
    let candidate = request.vin.trim().to_uppercase();

    if !vin::is_valid_vin(&candidate) {
        return VinScanError::Validation("VIN failed validation check".to_string()).into();
    }

    // Manually entered VINs carry no OCR provenance.
    let info = state
        .scan
        .decode_validated_vin(candidate, 1.0, String::new())
        .await;

    ApiResponse::success(info)
}
