//! reqwest-backed transport gateway.

use bytes::Bytes;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};

use super::retry::{self, Outcome};
use super::{ApiRequest, ApiResponse, Transport, Upload, errors, fingerprint, timing};
use crate::config::{ClientConfig, RetryConfig};
use crate::error::{PdfDancerError, PdfDancerResult};
use crate::models::NewDocumentOptions;

const USER_AGENT: &str = concat!("pdfdancer-client-rust/", env!("CARGO_PKG_VERSION"));

/// HTTP transport bound to one server session
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
    session_id: String,
    retry: RetryConfig,
    log_server_timing: bool,
}

#[derive(Deserialize)]
struct AnonymousToken {
    token: String,
}

impl HttpTransport {
    /// Upload a PDF and open a session on it
    pub async fn open(config: &ClientConfig, pdf: Bytes) -> PdfDancerResult<Self> {
        if pdf.is_empty() {
            return Err(PdfDancerError::validation("PDF data cannot be empty"));
        }
        let mut transport = Self::connect(config).await?;
        let upload = Upload {
            path: "/session/create".to_string(),
            field: "pdf".to_string(),
            file_name: "document.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: pdf,
        };
        let response = transport.send_upload(&upload).await?;
        transport.session_id = session_id_from(&response)?;
        info!(session_id = %transport.session_id, "Session created from uploaded PDF");
        Ok(transport)
    }

    /// Open a session on a new blank document
    pub async fn new_document(
        config: &ClientConfig,
        options: &NewDocumentOptions,
    ) -> PdfDancerResult<Self> {
        options.validate()?;
        let mut transport = Self::connect(config).await?;
        let response = transport
            .send_request(ApiRequest::post("/session/new").json(options)?)
            .await?;
        transport.session_id = session_id_from(&response)?;
        info!(
            session_id = %transport.session_id,
            pages = options.initial_page_count,
            "Session created for blank document"
        );
        Ok(transport)
    }

    async fn connect(config: &ClientConfig) -> PdfDancerResult<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.verify_tls);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| PdfDancerError::Request {
            context: "building HTTP client".to_string(),
            source,
        })?;

        let mut transport = Self {
            client,
            base_url: config.resolved_base_url(),
            token: String::new(),
            session_id: String::new(),
            retry: config.retry.clone(),
            log_server_timing: config.log_server_timing,
        };
        transport.token = match config.resolved_token() {
            Some(token) => token.to_string(),
            None => transport.obtain_anonymous_token().await?,
        };
        Ok(transport)
    }

    async fn obtain_anonymous_token(&self) -> PdfDancerResult<String> {
        let fingerprint = fingerprint::generate(fingerprint::default_salt_path().as_deref());
        let url = join_url(&self.base_url, "/keys/anon");
        let response = self
            .dispatch("POST /keys/anon", || {
                Ok(self
                    .client
                    .post(&url)
                    .header("X-Fingerprint", fingerprint.as_str()))
            })
            .await
            .map_err(|e| PdfDancerError::Session {
                message: format!("Failed to obtain anonymous token: {}", e),
            })?;

        let token: AnonymousToken =
            serde_json::from_slice(&response.body).map_err(|_| PdfDancerError::Session {
                message: "Invalid anonymous token response format".to_string(),
            })?;
        debug!("Obtained anonymous token");
        Ok(token.token)
    }

    async fn send_request(&self, request: ApiRequest) -> PdfDancerResult<ApiResponse> {
        let label = request.label();
        let url = join_url(&self.base_url, &request.path);
        let request_bytes = request
            .body
            .as_ref()
            .map(|body| body.to_string().len())
            .unwrap_or(0);
        debug!(request = %label, request_bytes, "Sending request");

        self.dispatch(&label, || {
            let mut builder = self.client.request(request.method.clone(), &url);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
            Ok(builder)
        })
        .await
    }

    async fn send_upload(&self, upload: &Upload) -> PdfDancerResult<ApiResponse> {
        let label = format!("POST {}", upload.path);
        let url = join_url(&self.base_url, &upload.path);
        debug!(request = %label, request_bytes = upload.data.len(), "Uploading file");

        // Multipart forms are consumed on send, so each attempt builds its own
        self.dispatch(&label, || {
            let part = Part::bytes(upload.data.to_vec())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.content_type)
                .map_err(|source| PdfDancerError::Request {
                    context: format!("invalid content type {}", upload.content_type),
                    source,
                })?;
            let form = Form::new().part(upload.field.clone(), part);
            Ok(self.client.post(&url).multipart(form))
        })
        .await
    }

    /// Attach session headers, send, and retry while rate limited
    async fn dispatch<F>(&self, label: &str, build: F) -> PdfDancerResult<ApiResponse>
    where
        F: Fn() -> PdfDancerResult<RequestBuilder> + Send + Sync,
    {
        let build = &build;
        retry::run(&self.retry, label, move || async move {
            let mut request =
                build()?.header("X-Generated-At", timing::request_timestamp(Utc::now()));
            if !self.token.is_empty() {
                request = request.header(AUTHORIZATION, format!("Bearer {}", self.token));
            }
            if !self.session_id.is_empty() {
                request = request.header("X-Session-Id", self.session_id.as_str());
            }

            let response = request
                .send()
                .await
                .map_err(|source| PdfDancerError::Request {
                    context: label.to_string(),
                    source,
                })?;
            self.read_response(response, label).await
        })
        .await
    }

    async fn read_response(
        &self,
        response: Response,
        label: &str,
    ) -> PdfDancerResult<Outcome<ApiResponse>> {
        let status = response.status().as_u16();
        if self.log_server_timing {
            timing::log_server_timing(response.headers(), label);
        }
        let retry_after = retry::parse_retry_after(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|source| PdfDancerError::Request {
                context: format!("reading {} response", label),
                source,
            })?;
        debug!(request = %label, status, response_bytes = body.len(), "Response received");

        if status == 429 {
            return Ok(Outcome::RateLimited {
                retry_after,
                message: errors::extract_error_message(status, &body),
            });
        }
        if !(200..300).contains(&status) {
            return Err(errors::error_for_status(status, &body));
        }
        Ok(Outcome::Ready(ApiResponse::new(status, body)))
    }
}

impl Transport for HttpTransport {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn send(&self, request: ApiRequest) -> PdfDancerResult<ApiResponse> {
        self.send_request(request).await
    }

    async fn upload(&self, upload: Upload) -> PdfDancerResult<ApiResponse> {
        self.send_upload(&upload).await
    }
}

/// Join base URL and path with exactly one slash
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn session_id_from(response: &ApiResponse) -> PdfDancerResult<String> {
    let session_id = response.text().trim().to_string();
    if session_id.is_empty() {
        return Err(PdfDancerError::Session {
            message: "Server returned empty session ID".to_string(),
        });
    }
    Ok(session_id)
}
