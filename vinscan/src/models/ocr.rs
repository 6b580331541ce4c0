use serde::{Deserialize, Serialize};

/// A single recognized word with its axis-aligned bounding box.
///
/// Coordinates are provider-defined: Textract returns fractions of the page
/// in [0,1], Google Vision returns pixel offsets. Consumers that need
/// normalized geometry must check which backend produced the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub confidence: f32,
}

/// Output of one OCR engine call over one image.
///
/// "No text found" is represented as an empty `text` with zero confidence,
/// never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
    pub bounding_boxes: Vec<WordBox>,
}

impl OcrResult {
    /// Result for an image in which the engine found no text at all.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            bounding_boxes: Vec::new(),
        }
    }
}
