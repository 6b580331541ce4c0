pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod router;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::api::state::AppState;
    use crate::config::Config;
    use crate::error::Result;
    use crate::models::{NhtsaDecode, OcrResult};
    use crate::ocr::{OcrEngine, OcrProvider};
    use crate::registry::VinDecoder;
    use crate::services::ScanService;

    const VALID_VIN: &str = "1HGCM82633A004352";

    struct FixedTextEngine {
        text: String,
    }

    #[async_trait]
    impl OcrEngine for FixedTextEngine {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn extract_text(&self, _image: &[u8]) -> Result<OcrResult> {
            Ok(OcrResult {
                text: self.text.clone(),
                confidence: 0.9,
                bounding_boxes: Vec::new(),
            })
        }
    }

    struct StubDecoder;

    #[async_trait]
    impl VinDecoder for StubDecoder {
        async fn decode_vin(&self, _vin: &str) -> NhtsaDecode {
            NhtsaDecode {
                make: Some("HONDA".to_string()),
                model: Some("Accord".to_string()),
                model_year: Some("2003".to_string()),
                ..NhtsaDecode::default()
            }
        }
    }

    fn test_state(api_keys: Vec<String>) -> AppState {
        let mut config = Config::default();
        config.server.api_keys = api_keys;

        let provider = OcrProvider::from_engine(
            "fixed",
            Arc::new(FixedTextEngine {
                text: format!("VIN {VALID_VIN}"),
            }),
        );
        let scan = ScanService::new(Arc::new(provider), Arc::new(StubDecoder));

        AppState::new(config, scan)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn decode_request(vin: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/vins:decode")
            .header("content-type", "application/json");
        if let Some(key) = auth {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        builder
            .body(Body::from(format!(r#"{{"vin":"{vin}"}}"#)))
            .unwrap()
    }

    #[tokio::test]
    async fn protected_route_requires_auth() {
        let app = create_router(test_state(vec!["test-key".to_string()]));

        let response = app.oneshot(decode_request(VALID_VIN, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "unauthorized");
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let app = create_router(test_state(vec!["test-key".to_string()]));

        let response = app
            .oneshot(decode_request(VALID_VIN, Some("other-key")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Invalid API key");
    }

    #[tokio::test]
    async fn no_configured_keys_locks_down_protected_routes() {
        let app = create_router(test_state(vec![]));

        let response = app
            .oneshot(decode_request(VALID_VIN, Some("any")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("VINSCAN_API_KEYS"));
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["ocr"]["provider"], "fixed");
    }

    #[tokio::test]
    async fn openapi_json_is_public_and_valid() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let version = json["openapi"]
            .as_str()
            .expect("openapi field should be a string");
        assert!(
            version.starts_with("3"),
            "OpenAPI version should start with 3, got: {version}"
        );
    }

    #[tokio::test]
    async fn success_envelope_has_data_no_error() {
        let app = create_router(test_state(vec!["k".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json.get("data").is_some(), "success should have 'data' key");
        assert!(
            json.get("error").is_none(),
            "success should NOT have 'error' key"
        );
    }

    #[tokio::test]
    async fn decode_rejects_invalid_check_digit() {
        let app = create_router(test_state(vec!["key".to_string()]));

        let response = app
            .oneshot(decode_request("1HGCM82634A004352", Some("key")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
        assert_eq!(json["error"]["message"], "VIN failed validation check");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn decode_returns_vehicle_info() {
        let app = create_router(test_state(vec!["key".to_string()]));

        let response = app
            .oneshot(decode_request(VALID_VIN, Some("key")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["vin"], VALID_VIN);
        assert_eq!(json["data"]["make"], "HONDA");
        assert_eq!(json["data"]["year"], 2003);
        assert_eq!(json["data"]["isValid"], true);
    }

    #[tokio::test]
    async fn decode_normalizes_lowercase_input() {
        let app = create_router(test_state(vec!["key".to_string()]));

        let response = app
            .oneshot(decode_request(&VALID_VIN.to_lowercase(), Some("key")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["vin"], VALID_VIN);
    }

    #[tokio::test]
    async fn scan_runs_the_full_pipeline() {
        let app = create_router(test_state(vec!["key".to_string()]));

        let boundary = "vinscan-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"vin.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n\
             fake-image-bytes\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/scans")
                    .header("Authorization", "Bearer key")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["vin"], VALID_VIN);
        assert_eq!(json["data"]["make"], "HONDA");
        // A clean decode serializes without error fields.
        assert!(json["data"]["nhtsaData"].is_object());
        assert!(json["data"]["nhtsaData"].get("errorCode").is_none());
    }

    #[tokio::test]
    async fn scan_without_image_field_is_rejected() {
        let app = create_router(test_state(vec!["key".to_string()]));

        let boundary = "vinscan-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"unrelated\"\r\n\r\n\
             value\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/scans")
                    .header("Authorization", "Bearer key")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }
}
