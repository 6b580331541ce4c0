use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::OcrConfig;
use crate::error::{Result, VinScanError};
use crate::models::{OcrResult, WordBox};

use super::OcrEngine;

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// The subset of a Google service-account key file this engine needs.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize, Default)]
struct AnnotateImageResponse {
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    confidence: f32,
    #[serde(rename = "boundingPoly")]
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Debug, Deserialize, Default)]
struct Vertex {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
}

/// Cloud text detection through the Google Vision `images:annotate`
/// endpoint.
///
/// Authorization mints an RS256 service-account assertion and exchanges it
/// for a bearer token on every call; a failed exchange is surfaced as an
/// error, never treated as success. Word boxes are built from polygon
/// vertices reduced to axis-aligned rectangles in pixel units.
pub struct GoogleVisionEngine {
    client: Client,
    signing_key: EncodingKey,
    client_email: String,
    base_url: String,
    token_url: String,
}

impl GoogleVisionEngine {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let credentials_json = config.google_credentials_json.as_deref().ok_or_else(|| {
            VinScanError::Ocr("Google Vision credentials not configured".to_string())
        })?;

        let key: ServiceAccountKey = serde_json::from_str(credentials_json)
            .map_err(|e| VinScanError::Ocr(format!("Invalid Google credentials JSON: {e}")))?;

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| VinScanError::Ocr(format!("Invalid Google private key: {e}")))?;

        let token_url = config
            .google_token_url
            .clone()
            .or(key.token_uri)
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());

        let base_url = config
            .google_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VinScanError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            signing_key,
            client_email: key.client_email,
            base_url,
            token_url,
        })
    }

    /// Exchange a freshly minted service-account assertion for an access
    /// token. One attempt; any failure is the caller's error to report.
    async fn fetch_access_token(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SCOPE,
            aud: &self.token_url,
            exp: now + 3600,
            iat: now,
        };

        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.signing_key,
        )
        .map_err(|e| VinScanError::ApiAuth(format!("Failed to sign assertion: {e}")))?;

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| VinScanError::ApiAuth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VinScanError::ApiAuth(format!(
                "Token request failed: {status} - {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| VinScanError::ApiAuth(format!("Malformed token response: {e}")))?;

        Ok(token.access_token)
    }

    fn word_box(annotation: &TextAnnotation) -> WordBox {
        let vertices = annotation
            .bounding_poly
            .as_ref()
            .map(|p| p.vertices.as_slice())
            .unwrap_or(&[]);

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for v in vertices {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }
        if vertices.is_empty() {
            min_x = 0.0;
            min_y = 0.0;
            max_x = 0.0;
            max_y = 0.0;
        }

        WordBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
            text: annotation.description.clone(),
            confidence: annotation.confidence,
        }
    }
}

#[async_trait]
impl OcrEngine for GoogleVisionEngine {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn extract_text(&self, image: &[u8]) -> Result<OcrResult> {
        let access_token = self.fetch_access_token().await?;

        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION",
                    max_results: 50,
                }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| VinScanError::Ocr(format!("google vision: request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VinScanError::Ocr(format!(
                "google vision: API error: {status} - {body}"
            )));
        }

        let annotate: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| VinScanError::Ocr(format!("google vision: malformed response: {e}")))?;

        let annotations = annotate
            .responses
            .into_iter()
            .next()
            .unwrap_or_default()
            .text_annotations;

        // The first annotation aggregates all detected text; the rest are
        // per-word.
        let Some(full) = annotations.first() else {
            return Ok(OcrResult::empty());
        };

        let bounding_boxes = annotations.iter().skip(1).map(Self::word_box).collect();

        Ok(OcrResult {
            text: full.description.clone(),
            confidence: full.confidence,
            bounding_boxes,
        })
    }
}
