//! HTTP utilities for DigitalOcean REST API calls

use crate::error::{SyncError, SyncResult};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for DigitalOcean API calls.
///
/// Issues a single authenticated request per call and returns parsed JSON
/// or a typed failure. There is no automatic retry and no backoff: a
/// failed call terminates the enclosing operation, which keeps create
/// operations from being silently duplicated.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> SyncResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("dosync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> SyncResult<Value> {
        self.request(Method::GET, url, token, None).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> SyncResult<Value> {
        self.request(Method::POST, url, token, body).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, token: &str, body: Option<&Value>) -> SyncResult<Value> {
        self.request(Method::PUT, url, token, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> SyncResult<Value> {
        self.request(Method::DELETE, url, token, None).await
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> SyncResult<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let body_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound {
                resource: url.to_string(),
            });
        }

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body_text));
            return Err(SyncError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body: body_text,
            });
        }

        // Handle empty response
        if body_text.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body_text)?)
    }
}
