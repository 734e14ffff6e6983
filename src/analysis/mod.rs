//! Analysis result data model.
//!
//! # Responsibilities
//! - Typed mirror of the prediction endpoint's JSON body
//! - Structural checks the UI relies on (five labels, detection count)
//! - Decoding of the base64 data URIs carried in the body

pub mod data_uri;
pub mod types;

pub use data_uri::{decode_data_uri, DataUri, DataUriError};
pub use types::{
    AnalysisResult, ConfidenceTier, DiseaseLabel, OverlayImage, Prediction, ResultViolation,
};
