use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::services::auth::claims::RegisteredClaim;
use crate::services::jwks::KeySetError;

/// Errors returned by access-token verification.
///
/// The variant is for server-side logs only; clients always see the same
/// unauthenticated response.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    KeySet(#[from] KeySetError),

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("no key in key set matches kid '{0}'")]
    UnknownKey(String),

    #[error("alg {alg:?} is not accepted by key '{kid}'")]
    AlgorithmMismatch { kid: String, alg: Algorithm },

    #[error("signature verification failed")]
    BadSignature,

    #[error("invalid '{claim}' claim: {reason}")]
    ClaimInvalid {
        claim: RegisteredClaim,
        reason: &'static str,
    },
}

impl VerifyError {
    /// Stable short name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeySet(KeySetError::NotConfigured(_)) => "key_set_not_configured",
            Self::KeySet(KeySetError::FetchFailed { .. }) => "fetch_failed",
            Self::KeySet(KeySetError::ParseFailed { .. }) => "parse_failed",
            Self::Malformed(_) => "malformed",
            Self::UnknownKey(_) => "unknown_key",
            Self::AlgorithmMismatch { .. } => "algorithm_mismatch",
            Self::BadSignature => "bad_signature",
            Self::ClaimInvalid { .. } => "claim_invalid",
        }
    }
}
