//! NHTSA vPIC vehicle registry client.
//!
//! Decoding is error-as-data: every failure mode, from transport errors to
//! registry-side suggestions, lands in the returned [`NhtsaDecode`] rather
//! than an `Err`. A clean decode carries no error fields; the registry's
//! "0" success code is normalized away.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{Result, VinScanError};
use crate::models::NhtsaDecode;

/// Sentinel error code for failures that never reached the registry's own
/// error reporting (network failures, non-2xx responses, malformed bodies).
const DECODE_FAILED_CODE: &str = "999";
const DECODE_FAILED_TEXT: &str = "Failed to decode VIN";

/// Resolves a VIN to vehicle attributes.
#[async_trait]
pub trait VinDecoder: Send + Sync {
    async fn decode_vin(&self, vin: &str) -> NhtsaDecode;
}

#[derive(Debug, Deserialize)]
struct DecodeVinResponse {
    #[serde(rename = "Results", default)]
    results: Vec<DecodeRow>,
}

#[derive(Debug, Deserialize)]
struct DecodeRow {
    #[serde(rename = "Variable", default)]
    variable: String,
    #[serde(rename = "Value")]
    value: Option<String>,
}

pub struct NhtsaClient {
    client: reqwest::Client,
    base_url: String,
}

impl NhtsaClient {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VinScanError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn failed(detail: String) -> NhtsaDecode {
        NhtsaDecode {
            error_code: Some(DECODE_FAILED_CODE.to_string()),
            error_text: Some(DECODE_FAILED_TEXT.to_string()),
            additional_error_text: Some(detail),
            ..NhtsaDecode::default()
        }
    }

    fn map_results(rows: &[DecodeRow]) -> NhtsaDecode {
        let mut decode = NhtsaDecode::default();

        // vPIC returns one row per variable; blank values are normalized
        // to absent fields.
        let field = |name: &str| -> Option<String> {
            rows.iter()
                .find(|r| r.variable == name)
                .and_then(|r| r.value.as_deref())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        decode.make = field("Make");
        decode.model = field("Model");
        decode.model_year = field("Model Year");
        decode.vehicle_type = field("Vehicle Type");
        decode.trim = field("Trim");
        decode.engine_info = field("Engine Model");
        decode.transmission_info = field("Transmission Style");
        decode.drive_type = field("Drive Type");
        decode.fuel_type = field("Fuel Type - Primary");
        decode.plant_country = field("Plant Country");
        decode.plant_company_name = field("Plant Company Name");
        decode.plant_state = field("Plant State");
        decode.plant_city = field("Plant City");

        // A clean decode carries no error fields at all; "0" means success.
        if let Some(code) = field("Error Code").filter(|c| c != "0") {
            decode.error_code = Some(code);
            decode.error_text = field("Error Text");
            decode.additional_error_text = field("Additional Error Text");
        }

        decode
    }
}

#[async_trait]
impl VinDecoder for NhtsaClient {
    async fn decode_vin(&self, vin: &str) -> NhtsaDecode {
        let url = format!("{}/vehicles/DecodeVin/{vin}?format=json", self.base_url);
        debug!(vin, "Decoding VIN via NHTSA vPIC");

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(vin, error = %e, "NHTSA request failed");
                return Self::failed(format!("request failed: {e}"));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!(vin, %status, "NHTSA returned an error status");
            return Self::failed(format!("API error: {status}"));
        }

        match response.json::<DecodeVinResponse>().await {
            Ok(body) => {
                let decode = Self::map_results(&body.results);
                if decode.has_error() {
                    debug!(vin, error_code = ?decode.error_code, "NHTSA reported decode errors");
                }
                decode
            }
            Err(e) => {
                warn!(vin, error = %e, "NHTSA response was not valid JSON");
                Self::failed(format!("malformed response: {e}"))
            }
        }
    }
}
