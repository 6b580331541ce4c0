//! OCR (Optical Character Recognition) module.
//!
//! Extracts text plus word-level geometry from VIN plate photographs.
//! Three backends implement the [`OcrEngine`] trait:
//!
//! - **Google Vision** (`provider = "google"`): cloud text detection,
//!   authorized with a service-account assertion exchanged for a bearer
//!   token.
//! - **AWS Textract** (`provider = "aws"`): synchronous document analysis
//!   with Signature Version 4 request signing.
//! - **Tesseract** (anything else): local OCR via leptess, no network
//!   dependency.
//!
//! [`OcrProvider`] selects exactly one backend at construction time from
//! `OcrConfig.provider`; there is no runtime mixing or fan-out. A backend
//! whose credentials are missing degrades to an unavailable state that
//! reports a structured error on use rather than failing construction.

mod google;
mod provider;
mod tesseract;
mod textract;

pub use google::GoogleVisionEngine;
pub use provider::{OcrEngine, OcrProvider};
pub use tesseract::TesseractEngine;
pub use textract::TextractEngine;
