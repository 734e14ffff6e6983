//! Shared mock inference backend for integration tests.

#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use lungai::config::{ClientConfig, DEFAULT_PROBE_SENTINEL};

/// Canned reply for one request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn awake() -> Self {
        Self::json(200, json!({ "message": DEFAULT_PROBE_SENTINEL }))
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn respond(self) -> Response {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// What the mock saw in a multipart upload.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub field_names: Vec<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

type HealthFn = dyn Fn(u32) -> Reply + Send + Sync;
type PredictFn = dyn Fn(&Upload) -> Reply + Send + Sync;

#[derive(Clone)]
struct MockState {
    health: Arc<HealthFn>,
    predict: Arc<PredictFn>,
    health_hits: Arc<AtomicU32>,
    uploads: Arc<Mutex<Vec<Upload>>>,
}

/// Handle to a running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    health_hits: Arc<AtomicU32>,
    uploads: Arc<Mutex<Vec<Upload>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn health_hits(&self) -> u32 {
        self.health_hits.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

async fn health_handler(State(state): State<MockState>) -> Response {
    let n = state.health_hits.fetch_add(1, Ordering::SeqCst) + 1;
    (state.health)(n).respond().await
}

async fn predict_handler(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut upload = Upload::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            upload.file_name = field.file_name().map(str::to_string);
            upload.content_type = field.content_type().map(str::to_string);
            upload.bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        }
        upload.field_names.push(name);
    }
    let reply = (state.predict)(&upload);
    state.uploads.lock().unwrap().push(upload);
    reply.respond().await
}

/// Start a programmable backend on an ephemeral port.
///
/// `health` receives the 1-based hit number of the root route.
pub async fn start_programmable_backend<H, P>(health: H, predict: P) -> MockBackend
where
    H: Fn(u32) -> Reply + Send + Sync + 'static,
    P: Fn(&Upload) -> Reply + Send + Sync + 'static,
{
    let health_hits = Arc::new(AtomicU32::new(0));
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        health: Arc::new(health),
        predict: Arc::new(predict),
        health_hits: health_hits.clone(),
        uploads: uploads.clone(),
    };

    let app = Router::new()
        .route("/", get(health_handler))
        .route("/predict", post(predict_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend {
        addr,
        health_hits,
        uploads,
    }
}

/// Backend whose root route is always awake and whose predict route returns `reply`.
pub async fn start_predict_backend(reply: Reply) -> MockBackend {
    start_programmable_backend(|_| Reply::awake(), move |_| reply.clone()).await
}

/// An address with nothing listening on it.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointed at `url` with short probe deadlines.
pub fn test_config(url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.backend.base_url = url.to_string();
    config.backend.use_system_proxy = false;
    config.probe.timeout_ms = 2_000;
    config
}

/// A prediction body in the backend's wire format.
pub fn analysis_body(detected: &[&str]) -> Value {
    let labels = ["Normal", "COVID", "TB", "Pneumonia", "Lung_Opacity"];
    let predictions: Vec<Value> = labels
        .iter()
        .map(|label| {
            let hit = detected.contains(label);
            json!({
                "disease": label,
                "confidence": if hit { 0.87 } else { 0.04 },
                "detected": hit,
                "color": "rgb(255, 69, 96)",
            })
        })
        .collect();
    let overlays: Vec<Value> = detected
        .iter()
        .map(|label| {
            json!({
                "disease": label,
                "image": "data:image/png;base64,iVBORw0KGgo=",
                "confidence": 0.87,
            })
        })
        .collect();

    json!({
        "success": true,
        "predictions": predictions,
        "detected_diseases": detected,
        "overlay_images": overlays,
        "original_image": "data:image/png;base64,iVBORw0KGgo=",
        "total_detections": detected.len(),
    })
}
