//! Bearer-credential resolution.
//!
//! The identity provider is an external collaborator: the core only
//! needs "opaque bearer token in, stable user id out". The trait is
//! injected into the dispatcher at startup so tests can substitute a
//! fake without process-wide state.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential was presented.
    #[error("authentication required")]
    MissingCredential,

    /// The credential did not resolve to a user.
    #[error("invalid credential")]
    InvalidCredential,

    /// The identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves an opaque bearer credential to a user identity.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn resolve_bearer(&self, token: &str) -> Result<String, AuthError>;
}

/// Token-table provider backed by the seed file or environment.
///
/// Stands in for the hosted identity service; lookups are exact-match
/// and unknown tokens are invalid, never guessed.
#[derive(Debug, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuth {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Parse the `REELBRIEF_TOKENS` format: `token=user` pairs
    /// separated by commas.
    pub fn from_env_value(raw: &str) -> Self {
        let tokens = raw
            .split(',')
            .filter_map(|pair| {
                let (token, user) = pair.split_once('=')?;
                let token = token.trim();
                let user = user.trim();
                if token.is_empty() || user.is_empty() {
                    None
                } else {
                    Some((token.to_string(), user.to_string()))
                }
            })
            .collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn resolve_bearer(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_token() {
        let auth = StaticTokenAuth::from_env_value("tok_live=user-1, tok_ci=bot");
        assert_eq!(auth.resolve_bearer("tok_live").await.unwrap(), "user-1");
        assert_eq!(auth.resolve_bearer("tok_ci").await.unwrap(), "bot");
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let auth = StaticTokenAuth::from_env_value("tok_live=user-1");
        assert!(matches!(
            auth.resolve_bearer("tok_stale").await,
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn skips_malformed_pairs() {
        let auth = StaticTokenAuth::from_env_value("tok_live=user-1,garbage,=x,y=");
        assert_eq!(auth.tokens.len(), 1);
    }
}
