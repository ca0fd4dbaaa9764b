use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Caller};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Bearer token required")]
    MissingToken,

    #[error("Invalid bearer token")]
    InvalidToken,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Gate in front of privileged routes (the sync trigger).
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Caller, AuthError>;

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}
