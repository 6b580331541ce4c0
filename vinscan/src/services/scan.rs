use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{OcrResult, VehicleInfo, VinExtraction, WordBox};
use crate::ocr::OcrProvider;
use crate::registry::VinDecoder;
use crate::vin;

const NO_VIN_FOUND: &str = "No valid VIN found in image";
const VIN_INVALID: &str = "VIN failed validation check";

/// Orchestrates the scan pipeline: OCR, VIN extraction and check-digit
/// validation, then registry decode.
///
/// The pipeline degrades instead of failing: OCR and registry errors become
/// fields on the returned artifacts, and the registry is never consulted for
/// a VIN that did not pass validation.
#[derive(Clone)]
pub struct ScanService {
    ocr: Arc<OcrProvider>,
    decoder: Arc<dyn VinDecoder>,
}

impl ScanService {
    pub fn new(ocr: Arc<OcrProvider>, decoder: Arc<dyn VinDecoder>) -> Self {
        Self { ocr, decoder }
    }

    pub fn ocr_available(&self) -> bool {
        self.ocr.is_available()
    }

    pub fn ocr_provider_name(&self) -> &str {
        self.ocr.name()
    }

    /// Runs OCR over the image and extracts the first candidate that passes
    /// the check digit.
    pub async fn extract_vin_from_image(&self, image: &[u8]) -> VinExtraction {
        let ocr = match self.ocr.extract_text(image).await {
            Ok(result) => result,
            Err(e) => {
                warn!(provider = self.ocr.name(), error = %e, "OCR failed");
                return VinExtraction {
                    vin: None,
                    confidence: 0.0,
                    is_valid: false,
                    extracted_text: String::new(),
                    bounding_box: None,
                    error: Some(e.to_string()),
                };
            }
        };

        match vin::extract_vin_from_text(&ocr.text) {
            Some(candidate) => {
                // The extractor only yields validated candidates; the
                // re-check keeps that invariant local instead of assumed.
                let is_valid = vin::is_valid_vin(&candidate);
                let bounding_box = find_vin_box(&ocr, &candidate);
                debug!(vin = %candidate, is_valid, "Extracted VIN from image");
                VinExtraction {
                    vin: Some(candidate),
                    confidence: ocr.confidence,
                    is_valid,
                    extracted_text: ocr.text,
                    bounding_box,
                    error: if is_valid {
                        None
                    } else {
                        Some(VIN_INVALID.to_string())
                    },
                }
            }
            None => VinExtraction {
                vin: None,
                confidence: ocr.confidence,
                is_valid: false,
                extracted_text: ocr.text,
                bounding_box: None,
                error: Some(NO_VIN_FOUND.to_string()),
            },
        }
    }

    /// Full pipeline: extraction followed by a registry decode when, and only
    /// when, a validated VIN came out of the image.
    pub async fn process_vin_image(&self, image: &[u8]) -> VehicleInfo {
        let extraction = self.extract_vin_from_image(image).await;

        let vin = match &extraction.vin {
            Some(v) if extraction.is_valid => v.clone(),
            _ => {
                return VehicleInfo {
                    vin: extraction.vin.unwrap_or_default(),
                    year: None,
                    make: None,
                    model: None,
                    trim: None,
                    is_valid: false,
                    confidence: extraction.confidence,
                    ocr_text: extraction.extracted_text,
                    nhtsa_data: None,
                    error: extraction.error.or_else(|| Some(VIN_INVALID.to_string())),
                };
            }
        };

        self.decode_validated_vin(vin, extraction.confidence, extraction.extracted_text)
            .await
    }

    /// Decodes a VIN that has already passed check-digit validation.
    pub async fn decode_validated_vin(
        &self,
        vin: String,
        confidence: f32,
        ocr_text: String,
    ) -> VehicleInfo {
        let decode = self.decoder.decode_vin(&vin).await;

        let year = decode
            .model_year
            .as_deref()
            .and_then(|y| y.trim().parse::<i32>().ok());
        let error = if decode.has_error() {
            decode.error_text.clone()
        } else {
            None
        };

        info!(
            %vin,
            make = ?decode.make,
            model = ?decode.model,
            decode_error = ?decode.error_code,
            "VIN processed"
        );

        VehicleInfo {
            vin,
            year,
            make: decode.make.clone(),
            model: decode.model.clone(),
            trim: decode.trim.clone(),
            is_valid: true,
            confidence,
            ocr_text,
            nhtsa_data: Some(decode),
            error,
        }
    }
}

/// Picks the word box that carried the VIN. OCR tokenization may split or
/// merge characters, so containment is checked in both directions; the first
/// match in reading order wins.
fn find_vin_box(ocr: &OcrResult, vin: &str) -> Option<WordBox> {
    ocr.bounding_boxes
        .iter()
        .find(|b| {
            let word = b.text.to_uppercase();
            word.contains(vin) || vin.contains(word.as_str())
        })
        .cloned()
}
