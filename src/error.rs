//! Error types for reconciliation operations.

use thiserror::Error;

/// Result type for reconciliation operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to the DigitalOcean API or mapping
/// its responses. Flows convert every variant into a structured error
/// result at the operation boundary; nothing is raised across it.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or unusable credential. Raised before any network call.
    #[error("{0}")]
    Configuration(String),

    /// The requested resource does not exist (HTTP 404). Recoverable:
    /// callers report it as a "resource absent" result.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Any other non-2xx API response, surfaced verbatim.
    #[error("API returned {status} {status_text}: {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },

    /// A field expected in a successful response was absent.
    #[error("failed to extract {0} from response")]
    Extraction(String),

    /// The listing endpoint kept reporting a next page past the safety cap.
    #[error("pagination limit exceeded after {pages} pages")]
    PageLimitExceeded { pages: u32 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
