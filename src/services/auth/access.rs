use crate::services::auth::{Claims, TokenVerifier, VerifyError};

/// Verifies access tokens for this API: a [`TokenVerifier`] bound to the
/// configured issuer and audience.
#[derive(Debug)]
pub struct AuthService {
    verifier: TokenVerifier,
    issuer: String,
    audience: String,
}

impl AuthService {
    pub fn new(verifier: TokenVerifier, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            verifier,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Recommended entry point for middleware.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, VerifyError> {
        self.verifier
            .verify(token, &self.issuer, &self.audience)
            .await
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }
}
