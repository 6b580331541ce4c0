use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::error::{Result, VinScanError};
use crate::models::OcrResult;

use super::{GoogleVisionEngine, TesseractEngine, TextractEngine};

/// One OCR backend: image bytes in, recognized text with word geometry out.
///
/// "No text found" is a success with an empty [`OcrResult`]; errors are
/// reserved for engine/network/auth failures and carry the backend name and
/// upstream status so they can be logged and surfaced.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract_text(&self, image: &[u8]) -> Result<OcrResult>;
}

#[derive(Clone)]
enum OcrBackend {
    Engine(Arc<dyn OcrEngine>),
    Unavailable { reason: String },
}

/// The single active OCR backend for a service instance.
///
/// Selection happens once per construction from `OcrConfig.provider`:
/// `"google"` and `"aws"` pick the cloud backends, any other value
/// (including unknown ones) falls back to local Tesseract. Construction
/// never fails; a backend that cannot be initialized degrades to an
/// unavailable state whose calls return [`VinScanError::OcrUnavailable`].
#[derive(Clone)]
pub struct OcrProvider {
    backend: OcrBackend,
    name: &'static str,
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Self {
        match config.provider.to_lowercase().as_str() {
            "google" => match GoogleVisionEngine::new(config) {
                Ok(engine) => {
                    info!("Google Vision OCR backend initialized");
                    Self::with_engine("google", Arc::new(engine))
                }
                Err(e) => Self::unavailable("google", e),
            },
            "aws" => match TextractEngine::new(config) {
                Ok(engine) => {
                    info!(region = %config.aws_region, "AWS Textract OCR backend initialized");
                    Self::with_engine("aws", Arc::new(engine))
                }
                Err(e) => Self::unavailable("aws", e),
            },
            other => {
                if other != "tesseract" {
                    warn!(provider = other, "Unknown OCR provider, using tesseract");
                }
                match TesseractEngine::new(&config.languages) {
                    Ok(engine) => {
                        info!(languages = %config.languages, "Tesseract OCR backend initialized");
                        Self::with_engine("tesseract", Arc::new(engine))
                    }
                    Err(e) => Self::unavailable("tesseract", e),
                }
            }
        }
    }

    fn with_engine(name: &'static str, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            backend: OcrBackend::Engine(engine),
            name,
        }
    }

    fn unavailable(name: &'static str, error: VinScanError) -> Self {
        let reason = format!("{name} OCR backend unavailable: {error}");
        warn!("{}", reason);
        Self {
            backend: OcrBackend::Unavailable { reason },
            name,
        }
    }

    /// Build a provider around an already-constructed engine. Used by tests
    /// to substitute scripted engines.
    pub fn from_engine(name: &'static str, engine: Arc<dyn OcrEngine>) -> Self {
        Self::with_engine(name, engine)
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn extract_text(&self, image: &[u8]) -> Result<OcrResult> {
        match &self.backend {
            OcrBackend::Engine(engine) => engine.extract_text(image).await,
            OcrBackend::Unavailable { reason } => {
                Err(VinScanError::OcrUnavailable(reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OcrConfig;

    fn make_config(provider: &str) -> OcrConfig {
        OcrConfig {
            provider: provider.to_string(),
            languages: "eng".to_string(),
            timeout_secs: 10,
            google_credentials_json: None,
            google_base_url: None,
            google_token_url: None,
            aws_region: "us-east-1".to_string(),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_base_url: None,
        }
    }

    #[test]
    fn google_without_credentials_degrades_to_unavailable() {
        let provider = OcrProvider::new(&make_config("google"));
        assert_eq!(provider.name(), "google");
        assert!(!provider.is_available());
    }

    #[test]
    fn aws_without_credentials_degrades_to_unavailable() {
        let provider = OcrProvider::new(&make_config("aws"));
        assert_eq!(provider.name(), "aws");
        assert!(!provider.is_available());
    }

    #[test]
    fn unknown_provider_falls_back_to_tesseract() {
        let provider = OcrProvider::new(&make_config("clippy-vision"));
        assert_eq!(provider.name(), "tesseract");
    }

    #[test]
    fn provider_selection_is_case_insensitive() {
        let provider = OcrProvider::new(&make_config("GOOGLE"));
        assert_eq!(provider.name(), "google");
    }

    #[tokio::test]
    async fn unavailable_backend_reports_structured_error() {
        let provider = OcrProvider::new(&make_config("google"));
        let result = provider.extract_text(&[]).await;
        assert!(matches!(result, Err(VinScanError::OcrUnavailable(_))));
    }
}
