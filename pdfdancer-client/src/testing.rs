//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use reqwest::Method;
use serde_json::Value;

use crate::error::{PdfDancerError, PdfDancerResult};
use crate::transport::{ApiRequest, ApiResponse, Transport, Upload};

type Script = HashMap<(Method, String), VecDeque<PdfDancerResult<ApiResponse>>>;

/// Records every request and answers from per-endpoint queues.
/// An endpoint with nothing queued answers 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    requests: Mutex<Vec<ApiRequest>>,
    uploads: Mutex<Vec<Upload>>,
    script: Mutex<Script>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, response: PdfDancerResult<ApiResponse>) {
        self.script
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn respond_json(&self, method: Method, path: &str, body: Value) {
        self.push(method, path, Ok(ApiResponse::new(200, body.to_string())));
    }

    pub fn respond_text(&self, method: Method, path: &str, body: &str) {
        self.push(method, path, Ok(ApiResponse::new(200, body.to_string())));
    }

    pub fn respond_error(&self, method: Method, path: &str, error: PdfDancerError) {
        self.push(method, path, Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    /// Number of requests sent to one endpoint
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn answer(&self, method: Method, path: &str) -> PdfDancerResult<ApiResponse> {
        self.script
            .lock()
            .unwrap()
            .get_mut(&(method.clone(), path.to_string()))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(PdfDancerError::Http {
                    status: 404,
                    message: format!("no scripted response for {} {}", method, path),
                })
            })
    }
}

impl Transport for FakeTransport {
    fn session_id(&self) -> &str {
        "test-session"
    }

    async fn send(&self, request: ApiRequest) -> PdfDancerResult<ApiResponse> {
        let (method, path) = (request.method.clone(), request.path.clone());
        self.requests.lock().unwrap().push(request);
        self.answer(method, &path)
    }

    async fn upload(&self, upload: Upload) -> PdfDancerResult<ApiResponse> {
        let path = upload.path.clone();
        self.uploads.lock().unwrap().push(upload);
        self.answer(Method::POST, &path)
    }
}
