use std::sync::Arc;

use async_trait::async_trait;
use leptess::LepTess;
use tokio::sync::Mutex;

use crate::error::{Result, VinScanError};
use crate::models::OcrResult;

use super::OcrEngine;

/// Local OCR through the Tesseract engine.
///
/// `LepTess` is not `Sync`, so the instance lives behind a mutex and all
/// recognition runs on the blocking thread pool. Tesseract reports a single
/// mean confidence for the page as a 0-100 score; no per-word geometry is
/// surfaced here.
pub struct TesseractEngine {
    tesseract: Arc<Mutex<LepTess>>,
}

impl TesseractEngine {
    pub fn new(languages: &str) -> Result<Self> {
        let tesseract = LepTess::new(None, languages).map_err(|e| {
            VinScanError::Ocr(format!(
                "Failed to initialize Tesseract for languages '{languages}': {e}"
            ))
        })?;

        Ok(Self {
            tesseract: Arc::new(Mutex::new(tesseract)),
        })
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn extract_text(&self, image: &[u8]) -> Result<OcrResult> {
        let bytes = image.to_vec();
        let tesseract = Arc::clone(&self.tesseract);

        tokio::task::spawn_blocking(move || {
            let mut lt = tesseract.blocking_lock();
            lt.set_image_from_mem(&bytes)
                .map_err(|e| VinScanError::Ocr(format!("tesseract: failed to set image: {e}")))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| VinScanError::Ocr(format!("tesseract: failed to extract text: {e}")))?;

            let text = text.trim().to_string();
            if text.is_empty() {
                return Ok(OcrResult::empty());
            }

            let confidence = lt.mean_text_conf() as f32 / 100.0;
            Ok(OcrResult {
                text,
                confidence,
                bounding_boxes: Vec::new(),
            })
        })
        .await
        .map_err(|e| VinScanError::Ocr(format!("tesseract: OCR task panicked: {e}")))?
    }
}
