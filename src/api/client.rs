//! DigitalOcean API client
//!
//! Main client for interacting with the DigitalOcean REST API, combining
//! token acquisition, HTTP plumbing, and endpoint URL construction
//! against the configured API base.

use super::auth::TokenProvider;
use super::http::HttpClient;
use crate::error::{SyncError, SyncResult};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Default public API base.
pub const DEFAULT_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Main DigitalOcean client
#[derive(Clone)]
pub struct DoClient {
    tokens: Arc<dyn TokenProvider>,
    http: HttpClient,
    api_base: String,
}

impl DoClient {
    /// Create a client against the public API base.
    pub fn new(tokens: Arc<dyn TokenProvider>) -> SyncResult<Self> {
        Self::with_api_base(tokens, DEFAULT_API_BASE)
    }

    /// Create a client against an explicit API base (used by tests and
    /// private deployments).
    pub fn with_api_base(tokens: Arc<dyn TokenProvider>, api_base: &str) -> SyncResult<Self> {
        let base = Url::parse(api_base).map_err(|e| {
            SyncError::Configuration(format!("invalid API base URL {api_base}: {e}"))
        })?;

        Ok(Self {
            tokens,
            http: HttpClient::new()?,
            api_base: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Check that a token is available without issuing a request.
    pub fn preflight(&self) -> SyncResult<()> {
        self.tokens.token().map(|_| ())
    }

    /// Make a GET request to an API-relative path
    pub async fn get(&self, path: &str) -> SyncResult<Value> {
        let token = self.tokens.token()?;
        self.http.get(&self.url(path), &token).await
    }

    /// Make a POST request to an API-relative path
    pub async fn post(&self, path: &str, body: Option<&Value>) -> SyncResult<Value> {
        let token = self.tokens.token()?;
        self.http.post(&self.url(path), &token, body).await
    }

    /// Make a PUT request to an API-relative path
    pub async fn put(&self, path: &str, body: Option<&Value>) -> SyncResult<Value> {
        let token = self.tokens.token()?;
        self.http.put(&self.url(path), &token, body).await
    }

    /// Make a DELETE request to an API-relative path
    pub async fn delete(&self, path: &str) -> SyncResult<Value> {
        let token = self.tokens.token()?;
        self.http.delete(&self.url(path), &token).await
    }

    /// Fetch one page of a listing endpoint.
    pub async fn get_list(&self, path: &str, page: u32, per_page: u32) -> SyncResult<Value> {
        // The path may already carry query parameters (e.g. /images?private=true).
        let sep = if path.contains('?') { '&' } else { '?' };
        self.get(&format!("{path}{sep}per_page={per_page}&page={page}"))
            .await
    }

    /// Fetch a single resource, substituting the caller-supplied identifier
    /// into the path template's `{id}` placeholder.
    pub async fn get_resource(&self, template: &str, id: &str) -> SyncResult<Value> {
        let escaped = urlencoding::encode(id);
        self.get(&template.replace("{id}", &escaped)).await
    }

    /// Build a full URL from an API-relative path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}
