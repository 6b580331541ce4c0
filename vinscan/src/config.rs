use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

/// OCR backend selection and credential material.
///
/// Exactly one backend is active per service instance, chosen by `provider`
/// at construction time: `"google"`, `"aws"`, or anything else for local
/// Tesseract. The `*_base_url`/`*_token_url` overrides exist for tests and
/// self-hosted proxies.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub provider: String,
    pub languages: String,
    pub timeout_secs: u64,
    pub google_credentials_json: Option<String>,
    pub google_base_url: Option<String>,
    pub google_token_url: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("VINSCAN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("VINSCAN_PORT", 3000),
                api_keys: env::var("VINSCAN_API_KEYS")
                    .map(|keys| keys.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
            },
            ocr: OcrConfig {
                provider: env::var("OCR_PROVIDER").unwrap_or_else(|_| "tesseract".to_string()),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
                google_credentials_json: env::var("GOOGLE_APPLICATION_CREDENTIALS_JSON").ok(),
                google_base_url: env::var("GOOGLE_VISION_BASE_URL").ok(),
                google_token_url: env::var("GOOGLE_TOKEN_URL").ok(),
                aws_region: env::var("AWS_TEXTRACT_REGION")
                    .unwrap_or_else(|_| "us-east-1".to_string()),
                aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
                aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
                aws_base_url: env::var("AWS_TEXTRACT_BASE_URL").ok(),
            },
            registry: RegistryConfig {
                base_url: env::var("NHTSA_API_BASE")
                    .unwrap_or_else(|_| "https://vpic.nhtsa.dot.gov/api".to_string()),
                timeout_secs: parse_env_or("NHTSA_TIMEOUT", 30),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
