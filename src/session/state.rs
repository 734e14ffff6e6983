//! Analysis session state machine.

use std::fmt;
use std::mem;
use thiserror::Error;

use crate::analysis::AnalysisResult;
use crate::api::{ApiError, ApiResult, InferenceClient};
use crate::session::image::SelectedImage;
use crate::session::preview::{PreviewHandle, PreviewStore};

/// Substring of the backend error that triggers the setup hint.
pub const MODEL_MISSING_MARKER: &str = "Model file not found";

/// Extra guidance shown when the backend has no model weights.
pub const SETUP_HINT: &str = "Setup Required: download the model file and place it as \
model.pth in the backend directory.";

/// Coarse state of a session, without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    FileSelected,
    Loading,
    Results,
    Error,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::FileSelected => "file-selected",
            SessionPhase::Loading => "loading",
            SessionPhase::Results => "results",
            SessionPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// What the error state shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub message: String,
    pub setup_hint: Option<&'static str>,
}

impl ErrorView {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let setup_hint = message.contains(MODEL_MISSING_MARKER).then_some(SETUP_HINT);
        Self { message, setup_hint }
    }
}

impl From<&ApiError> for ErrorView {
    fn from(err: &ApiError) -> Self {
        ErrorView::new(err.user_message())
    }
}

/// Why a selection was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAnImage { media_type: String },
    TooLarge { bytes: u64, limit: u64 },
}

/// Result of offering a file to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Accepted,
    Ignored(IgnoreReason),
}

/// Requested action is not available in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while {phase}")]
pub struct SessionError {
    pub action: &'static str,
    pub phase: SessionPhase,
}

enum SessionState {
    Idle,
    FileSelected {
        image: SelectedImage,
        preview: PreviewHandle,
    },
    Loading {
        image: SelectedImage,
        preview: PreviewHandle,
    },
    Results {
        image: SelectedImage,
        preview: PreviewHandle,
        result: Box<AnalysisResult>,
    },
    Error {
        image: SelectedImage,
        preview: PreviewHandle,
        error: ErrorView,
    },
}

/// One user's upload/analyze flow.
pub struct AnalysisSession {
    state: SessionState,
    previews: PreviewStore,
    max_upload_bytes: u64,
}

impl AnalysisSession {
    pub fn new(previews: PreviewStore, max_upload_bytes: u64) -> Self {
        Self {
            state: SessionState::Idle,
            previews,
            max_upload_bytes,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::FileSelected { .. } => SessionPhase::FileSelected,
            SessionState::Loading { .. } => SessionPhase::Loading,
            SessionState::Results { .. } => SessionPhase::Results,
            SessionState::Error { .. } => SessionPhase::Error,
        }
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::FileSelected { image, .. }
            | SessionState::Loading { image, .. }
            | SessionState::Results { image, .. }
            | SessionState::Error { image, .. } => Some(image),
        }
    }

    pub fn preview_url(&self) -> Option<&str> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::FileSelected { preview, .. }
            | SessionState::Loading { preview, .. }
            | SessionState::Results { preview, .. }
            | SessionState::Error { preview, .. } => Some(preview.url()),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Results { result, .. } => Some(&**result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorView> {
        match &self.state {
            SessionState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Offer a file. Non-image or oversized files leave the state untouched.
    pub fn select_file(&mut self, image: SelectedImage) -> Result<Selection, SessionError> {
        let phase = self.phase();
        if !matches!(phase, SessionPhase::Idle | SessionPhase::FileSelected) {
            return Err(SessionError { action: "select a file", phase });
        }

        if !image.is_image() {
            tracing::debug!(media_type = %image.media_type(), "Ignoring non-image selection");
            return Ok(Selection::Ignored(IgnoreReason::NotAnImage {
                media_type: image.media_type().to_string(),
            }));
        }
        let bytes = image.len() as u64;
        if bytes > self.max_upload_bytes {
            tracing::debug!(bytes, limit = self.max_upload_bytes, "Ignoring oversized selection");
            return Ok(Selection::Ignored(IgnoreReason::TooLarge {
                bytes,
                limit: self.max_upload_bytes,
            }));
        }

        let preview = self.previews.create(&image);
        tracing::debug!(file = %image.name(), preview = %preview.url(), "File selected");
        // Replacing the state drops any previous preview handle.
        self.state = SessionState::FileSelected { image, preview };
        Ok(Selection::Accepted)
    }

    /// Move to `Loading` and hand back the image to upload.
    pub fn begin_analysis(&mut self) -> Result<SelectedImage, SessionError> {
        let phase = self.phase();
        match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::FileSelected { image, preview } | SessionState::Error { image, preview, .. } => {
                let upload = image.clone();
                self.state = SessionState::Loading { image, preview };
                Ok(upload)
            }
            other => {
                self.state = other;
                Err(SessionError { action: "start analysis", phase })
            }
        }
    }

    /// Apply the outcome of the request started by [`begin_analysis`](Self::begin_analysis).
    pub fn finish(&mut self, outcome: ApiResult<AnalysisResult>) -> Result<SessionPhase, SessionError> {
        let phase = self.phase();
        match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Loading { image, preview } => {
                self.state = match outcome {
                    Ok(result) => SessionState::Results {
                        image,
                        preview,
                        result: Box::new(result),
                    },
                    Err(e) => SessionState::Error {
                        image,
                        preview,
                        error: ErrorView::from(&e),
                    },
                };
                Ok(self.phase())
            }
            other => {
                self.state = other;
                Err(SessionError { action: "finish analysis", phase })
            }
        }
    }

    /// Upload the selected file and land in `Results` or `Error`.
    ///
    /// If the returned future is dropped before the backend answers, the
    /// session goes back to `FileSelected` with the same file.
    pub async fn analyze(&mut self, client: &InferenceClient) -> Result<SessionPhase, SessionError> {
        let image = self.begin_analysis()?;
        let mut in_flight = InFlight { session: self, settled: false };
        let outcome = client.predict(&image).await;
        in_flight.settled = true;
        in_flight.session.finish(outcome)
    }

    /// Put an unanswered `Loading` session back to `FileSelected`.
    pub fn cancel_analysis(&mut self) -> Result<(), SessionError> {
        let phase = self.phase();
        match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Loading { image, preview } => {
                tracing::debug!(file = %image.name(), "Analysis abandoned");
                self.state = SessionState::FileSelected { image, preview };
                Ok(())
            }
            other => {
                self.state = other;
                Err(SessionError { action: "cancel analysis", phase })
            }
        }
    }

    /// Discard file, preview and result, returning to `Idle`. Works from any state.
    pub fn reset(&mut self) {
        let phase = self.phase();
        self.state = SessionState::Idle;
        tracing::debug!(from = %phase, "Session reset");
    }
}

/// Rolls a session out of `Loading` when `analyze` is dropped mid-request.
struct InFlight<'a> {
    session: &'a mut AnalysisSession,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let _ = self.session.cancel_analysis();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::tests::sample_body;

    fn png(name: &str) -> SelectedImage {
        SelectedImage::new(name, "image/png", vec![0x89u8, b'P', b'N', b'G'])
    }

    fn session() -> (AnalysisSession, PreviewStore) {
        let store = PreviewStore::new();
        (AnalysisSession::new(store.clone(), 1024), store)
    }

    fn ok_result() -> AnalysisResult {
        serde_json::from_value(sample_body(&["Pneumonia"])).unwrap()
    }

    #[test]
    fn test_non_image_is_ignored() {
        let (mut s, store) = session();
        let pdf = SelectedImage::new("report.pdf", "application/pdf", vec![1u8]);

        let selection = s.select_file(pdf).unwrap();
        assert_eq!(
            selection,
            Selection::Ignored(IgnoreReason::NotAnImage { media_type: "application/pdf".into() })
        );
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.selected().is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_oversized_is_ignored() {
        let (mut s, _) = session();
        let big = SelectedImage::new("big.png", "image/png", vec![0u8; 2048]);
        assert!(matches!(
            s.select_file(big).unwrap(),
            Selection::Ignored(IgnoreReason::TooLarge { bytes: 2048, limit: 1024 })
        ));
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_replacing_selection_releases_preview() {
        let (mut s, store) = session();
        s.select_file(png("a.png")).unwrap();
        let first = s.preview_url().unwrap().to_string();

        s.select_file(png("b.png")).unwrap();
        assert_eq!(store.live_count(), 1);
        assert!(store.resolve(&first).is_none());
        assert_eq!(s.selected().unwrap().name(), "b.png");
    }

    #[test]
    fn test_success_then_reset() {
        let (mut s, store) = session();
        s.select_file(png("a.png")).unwrap();

        let upload = s.begin_analysis().unwrap();
        assert_eq!(upload.name(), "a.png");
        assert_eq!(s.phase(), SessionPhase::Loading);
        assert!(s.select_file(png("c.png")).is_err());

        assert_eq!(s.finish(Ok(ok_result())).unwrap(), SessionPhase::Results);
        let result = s.result().unwrap();
        assert_eq!(result.total_detections, result.detected_count());

        s.reset();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.result().is_none());
        assert!(s.preview_url().is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_error_shows_setup_hint_and_resets() {
        let (mut s, store) = session();
        s.select_file(png("a.png")).unwrap();
        s.begin_analysis().unwrap();

        let err = ApiError::Status {
            status: 500,
            detail: Some("Model file not found. Please ensure model.pth is in the backend directory.".into()),
        };
        assert_eq!(s.finish(Err(err)).unwrap(), SessionPhase::Error);
        let view = s.error().unwrap();
        assert!(view.message.starts_with("Model file not found"));
        assert_eq!(view.setup_hint, Some(SETUP_HINT));

        s.reset();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.error().is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_error_without_marker_has_no_hint() {
        let view = ErrorView::from(&ApiError::Malformed("eof".into()));
        assert_eq!(view.message, "An unexpected error occurred");
        assert!(view.setup_hint.is_none());
    }

    #[test]
    fn test_retry_from_error() {
        let (mut s, _) = session();
        s.select_file(png("a.png")).unwrap();
        s.begin_analysis().unwrap();
        s.finish(Err(ApiError::Network("connection refused".into()))).unwrap();

        s.begin_analysis().unwrap();
        assert_eq!(s.phase(), SessionPhase::Loading);
    }

    #[test]
    fn test_invalid_transitions() {
        let (mut s, _) = session();
        let err = s.begin_analysis().unwrap_err();
        assert_eq!(err.to_string(), "cannot start analysis while idle");
        assert_eq!(s.phase(), SessionPhase::Idle);

        assert!(s.finish(Ok(ok_result())).is_err());

        s.select_file(png("a.png")).unwrap();
        s.begin_analysis().unwrap();
        assert_eq!(s.phase(), SessionPhase::Loading);
        assert!(s.cancel_analysis().is_ok());
        assert!(s.cancel_analysis().is_err());
    }

    #[test]
    fn test_cancel_keeps_file_and_preview() {
        let (mut s, store) = session();
        s.select_file(png("a.png")).unwrap();
        let url = s.preview_url().unwrap().to_string();
        s.begin_analysis().unwrap();

        s.cancel_analysis().unwrap();
        assert_eq!(s.phase(), SessionPhase::FileSelected);
        assert_eq!(s.preview_url(), Some(url.as_str()));
        assert_eq!(store.live_count(), 1);
        s.begin_analysis().unwrap();
    }

    #[test]
    fn test_reset_from_loading() {
        let (mut s, store) = session();
        s.select_file(png("a.png")).unwrap();
        s.begin_analysis().unwrap();

        s.reset();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert_eq!(store.live_count(), 0);
        assert!(s.finish(Ok(ok_result())).is_err());
    }
}
