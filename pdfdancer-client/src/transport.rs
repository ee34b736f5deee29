//! Transport gateway: authenticated requests against one server session.
//!
//! The rest of the crate only sees the [`Transport`] trait. [`HttpTransport`]
//! is the production implementation on top of reqwest.

mod errors;
mod fingerprint;
mod http;
mod retry;
mod timing;

use std::future::Future;

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PdfDancerError, PdfDancerResult};

pub use http::HttpTransport;

/// A JSON request against the active session
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> PdfDancerResult<Self> {
        let value = serde_json::to_value(body).map_err(|source| PdfDancerError::InvalidResponse {
            context: format!("encoding {} {} body", self.method, self.path),
            source,
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// `METHOD /path` for log lines and error context
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A multipart file upload
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub path: String,
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Successful response body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self, context: &str) -> PdfDancerResult<T> {
        serde_json::from_slice(&self.body).map_err(|source| PdfDancerError::InvalidResponse {
            context: context.to_string(),
            source,
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Capability to perform requests within an established session.
///
/// Non-success outcomes are returned as errors; an `Ok` response always
/// carries a 2xx body.
pub trait Transport: Send + Sync {
    /// Server session this transport is bound to
    fn session_id(&self) -> &str;

    fn send(&self, request: ApiRequest) -> impl Future<Output = PdfDancerResult<ApiResponse>> + Send;

    fn upload(&self, upload: Upload) -> impl Future<Output = PdfDancerResult<ApiResponse>> + Send;
}
