//! `reqwest`-based client for the inference backend.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::api::error::{ApiError, ApiResult};
use crate::config::{AnalyzeConfig, BackendConfig};
use crate::observability::metrics;
use crate::resilience::timeouts::with_optional_timeout;
use crate::session::SelectedImage;

/// Multipart field name the prediction endpoint reads.
const FILE_FIELD: &str = "file";

/// Body of the backend's root route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Client for the health and prediction endpoints.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: Url,
    predict_url: Url,
    predict_timeout: Duration,
}

impl InferenceClient {
    /// Create a client from the backend and analyze sections of the config.
    pub fn new(backend: &BackendConfig, analyze: &AnalyzeConfig) -> ApiResult<Self> {
        let base_url = normalize_base(&backend.base_url)?;
        let predict_url = base_url.join("predict").map_err(|e| ApiError::InvalidUrl {
            url: backend.base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&backend.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("lungai"));
        headers.insert(USER_AGENT, agent);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if !backend.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            predict_url,
            predict_timeout: Duration::from_millis(analyze.timeout_ms),
        })
    }

    /// Root URL probed for health.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL the image is uploaded to.
    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    /// GET the root route and parse its JSON body, whatever the status.
    ///
    /// No deadline is applied here; callers wrap this in their own.
    pub async fn health(&self) -> ApiResult<HealthStatus> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, url = %self.base_url, "Sending health probe");

        let response = self
            .http
            .get(self.base_url.clone())
            .header("x-request-id", &request_id)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        serde_json::from_str::<HealthStatus>(&text).map_err(|e| {
            ApiError::Malformed(format!("health body (status {}): {}", status, e))
        })
    }

    /// Upload `image` as multipart field `file` and return the validated result.
    ///
    /// Never retried: the caller decides what to do with a failure.
    pub async fn predict(&self, image: &SelectedImage) -> ApiResult<AnalysisResult> {
        let request_id = Uuid::new_v4().to_string();
        tracing::info!(
            request_id = %request_id,
            file = %image.name(),
            media_type = %image.media_type(),
            bytes = image.len(),
            "Submitting image for analysis"
        );

        let outcome = with_optional_timeout(self.predict_timeout, self.send_predict(image, &request_id))
            .await
            .unwrap_or_else(|_| Err(ApiError::Timeout(self.predict_timeout.as_millis() as u64)));

        match &outcome {
            Ok(result) => {
                metrics::record_analysis("success");
                tracing::info!(
                    request_id = %request_id,
                    total_detections = result.total_detections,
                    "Analysis complete"
                );
            }
            Err(e) => {
                metrics::record_analysis(e.kind());
                tracing::warn!(request_id = %request_id, error = %e, "Analysis failed");
            }
        }
        outcome
    }

    async fn send_predict(&self, image: &SelectedImage, request_id: &str) -> ApiResult<AnalysisResult> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string())
            .mime_str(image.media_type())
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(self.predict_url.clone())
            .header("x-request-id", request_id)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: extract_detail(&text),
            });
        }

        let result: AnalysisResult =
            serde_json::from_str(&text).map_err(|e| ApiError::Malformed(e.to_string()))?;
        result
            .validate()
            .map_err(|v| ApiError::Malformed(v.to_string()))?;
        Ok(result)
    }
}

/// Parse the base URL and make sure relative joins stay under its path.
fn normalize_base(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: "cannot be used as a base".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Pull a string `detail` out of an error body, if there is one.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}
