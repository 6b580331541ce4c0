use serde::{Deserialize, Serialize};

use super::WordBox;

/// Result of running OCR + VIN extraction over one image.
///
/// `vin` is `Some` only when a candidate passed the check digit; `error` is
/// set whenever it is absent. `extracted_text` keeps the raw OCR output so
/// callers can show it for manual correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VinExtraction {
    pub vin: Option<String>,
    pub confidence: f32,
    pub is_valid: bool,
    pub extracted_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<WordBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Normalized NHTSA vPIC decode result.
///
/// Built from the registry's variable/value rows; attributes absent from the
/// response stay unset. `error_code`/`error_text` carry the registry's own
/// error signalling and can co-occur with populated vehicle fields (the
/// registry returns partial data alongside non-fatal warning codes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NhtsaDecode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_error_text: Option<String>,
}

impl NhtsaDecode {
    /// True when the registry reported a non-zero error code.
    pub fn has_error(&self) -> bool {
        matches!(self.error_code.as_deref(), Some(code) if code != "0")
    }
}

/// Terminal artifact of one scan: extraction merged with the registry decode.
///
/// Created per request and handed to the caller; this pipeline does not own
/// storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub vin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    pub is_valid: bool,
    pub confidence: f32,
    pub ocr_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nhtsa_data: Option<NhtsaDecode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
