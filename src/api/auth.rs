//! API token acquisition.
//!
//! DigitalOcean authenticates every call with a static bearer token. The
//! token source is injected into the client so the discover/import flows
//! never read ambient process state themselves; the environment lookup
//! lives here and is wired up only at the CLI boundary.

use crate::error::{SyncError, SyncResult};

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "DO_API_TOKEN";

/// Source of the bearer token used for API calls.
pub trait TokenProvider: Send + Sync {
    /// Return the bearer token, or a configuration error if none is
    /// available. Must not perform network I/O.
    fn token(&self) -> SyncResult<String>;
}

/// Token read from the `DO_API_TOKEN` environment variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTokenProvider;

impl TokenProvider for EnvTokenProvider {
    fn token(&self) -> SyncResult<String> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(SyncError::Configuration(format!(
                "{TOKEN_ENV_VAR} not found (hint: you may need a secret)"
            ))),
        }
    }
}

/// Fixed token, used for the `--token` flag, the config file, and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> SyncResult<String> {
        if self.token.trim().is_empty() {
            return Err(SyncError::Configuration(
                "API token is empty".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_returns_token() {
        let provider = StaticTokenProvider::new("dop_v1_abc123");
        assert_eq!(provider.token().unwrap(), "dop_v1_abc123");
    }

    #[test]
    fn empty_static_token_is_a_configuration_error() {
        let provider = StaticTokenProvider::new("  ");
        assert!(matches!(
            provider.token(),
            Err(SyncError::Configuration(_))
        ));
    }
}
