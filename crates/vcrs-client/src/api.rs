//! Complaint service HTTP client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ApiMessage, Complaint, ComplaintStatus, Credentials, LoginResponse, NewComplaint,
    Registration, StatusUpdate,
};

/// Header carrying the session token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Remote complaint service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /auth/register`
    async fn register(&self, registration: &Registration) -> ClientResult<serde_json::Value>;

    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse>;

    /// `POST /complaints` (multipart)
    async fn create_complaint(
        &self,
        token: &str,
        complaint: &NewComplaint,
    ) -> ClientResult<serde_json::Value>;

    /// `GET /complaints/user/:userId`
    async fn complaints_for_user(&self, token: &str, user_id: &str)
        -> ClientResult<Vec<Complaint>>;

    /// `GET /complaints`
    async fn all_complaints(&self, token: &str) -> ClientResult<Vec<Complaint>>;

    /// `PUT /complaints/:id/status`. Success is decided by status code
    /// alone; the reply body is not read.
    async fn update_status(
        &self,
        token: &str,
        complaint_id: &str,
        status: ComplaintStatus,
    ) -> ClientResult<()>;
}

/// `Backend` over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the configured service. No timeout is applied
    /// unless one is configured.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self::with_client(client, &config.api_base_url))
    }

    /// Create a backend with a custom client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("API base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn register(&self, registration: &Registration) -> ClientResult<serde_json::Value> {
        let response = self
            .client
            .post(self.url(&["auth", "register"])?)
            .json(registration)
            .send()
            .await?;

        read_response(response, "Registration failed.").await
    }

    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse> {
        let response = self
            .client
            .post(self.url(&["auth", "login"])?)
            .json(credentials)
            .send()
            .await?;

        read_response(response, "Login failed.").await
    }

    async fn create_complaint(
        &self,
        token: &str,
        complaint: &NewComplaint,
    ) -> ClientResult<serde_json::Value> {
        let mut form = Form::new();
        for (name, value) in complaint.text_fields() {
            form = form.text(name, value);
        }
        if let Some(image) = &complaint.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| ClientError::Config(format!("Invalid image type: {}", e)))?;
            form = form.part("image", part);
        }

        let response = self
            .client
            .post(self.url(&["complaints"])?)
            .header(AUTH_HEADER, token)
            .multipart(form)
            .send()
            .await?;

        read_response(response, "Check console.").await
    }

    async fn complaints_for_user(
        &self,
        token: &str,
        user_id: &str,
    ) -> ClientResult<Vec<Complaint>> {
        let response = self
            .client
            .get(self.url(&["complaints", "user", user_id])?)
            .header(AUTH_HEADER, token)
            .send()
            .await?;

        read_response(response, "Failed to fetch complaints.").await
    }

    async fn all_complaints(&self, token: &str) -> ClientResult<Vec<Complaint>> {
        let response = self
            .client
            .get(self.url(&["complaints"])?)
            .header(AUTH_HEADER, token)
            .send()
            .await?;

        read_response(response, "Failed to fetch complaints.").await
    }

    async fn update_status(
        &self,
        token: &str,
        complaint_id: &str,
        status: ComplaintStatus,
    ) -> ClientResult<()> {
        let response = self
            .client
            .put(self.url(&["complaints", complaint_id, "status"])?)
            .header(AUTH_HEADER, token)
            .json(&StatusUpdate { status })
            .send()
            .await?;

        let code = response.status().as_u16();
        if response.status().is_success() {
            tracing::debug!(status = code, "Response received");
            return Ok(());
        }
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        check_status(code, &body, "Failed to update status.")
    }
}

async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> ClientResult<T> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    tracing::debug!(status, bytes = body.len(), "Response received");
    classify(status, &body, fallback)
}

/// Map a status and body onto the success type or a typed error.
pub(crate) fn classify<T: DeserializeOwned>(
    status: u16,
    body: &str,
    fallback: &str,
) -> ClientResult<T> {
    if (200..300).contains(&status) {
        let text = if body.trim().is_empty() { "null" } else { body };
        return Ok(serde_json::from_str(text)?);
    }
    Err(error_for(status, body, fallback))
}

/// Success from the status code alone; the body is only read for errors.
pub(crate) fn check_status(status: u16, body: &str, fallback: &str) -> ClientResult<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    Err(error_for(status, body, fallback))
}

/// Typed error for a non-success reply.
///
/// Error bodies carry `{"msg": ...}`; `fallback` is used when it is missing.
pub(crate) fn error_for(status: u16, body: &str, fallback: &str) -> ClientError {
    let message = serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(|m| m.msg)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    match status {
        401 | 403 => ClientError::Unauthorized { status, message },
        _ => ClientError::Api { status, message },
    }
}
