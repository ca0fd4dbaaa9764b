//! Shared bearer token gate for the sync trigger.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Caller};

/// Accepts requests carrying `Authorization: Bearer <token>` where the token
/// matches the configured secret. This only keeps random callers from kicking
/// off syncs; it is not user authorization.
pub struct BearerTokenAuthenticator {
    expected_token: String,
}

impl BearerTokenAuthenticator {
    pub fn new(token: String) -> Self {
        Self {
            expected_token: token,
        }
    }
}

#[async_trait]
impl Authenticator for BearerTokenAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Caller, AuthError> {
        let provided = request.bearer_token().ok_or(AuthError::MissingToken)?;

        if constant_time_eq(provided.as_bytes(), self.expected_token.as_bytes()) {
            Ok(Caller::trusted_trigger())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    fn method_name(&self) -> &'static str {
        "bearer"
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
