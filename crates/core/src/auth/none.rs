use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Caller};

/// Lets every request through as anonymous.
/// Must be explicitly configured - the system won't default to this
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoneAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Caller, AuthError> {
        Ok(Caller::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}
