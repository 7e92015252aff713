//! Access-token (compact JWS) verification against the cached key set.
//!
//! Order of checks:
//! 1. structure + header (`alg`, `kid`)
//! 2. key lookup by `kid`, `alg` accepted by that key
//! 3. signature
//! 4. registered claims (`sub`, `iss`, `aud`, `exp`, `nbf`, `iat`)
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use tracing::debug;

use crate::services::auth::VerifyError;
use crate::services::auth::claims::{ClaimRules, Claims, RawClaims};
use crate::services::jwks::{KeySetCache, VerificationKey};

pub struct TokenVerifier {
    keys: Arc<KeySetCache>,
    jwks_url: String,
    leeway_seconds: u64,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("jwks_url", &self.jwks_url)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    /// Registers `jwks_url` with the cache; the key set is fetched lazily.
    pub fn new(keys: Arc<KeySetCache>, jwks_url: impl Into<String>, leeway_seconds: u64) -> Self {
        let jwks_url = jwks_url.into();
        keys.configure(&jwks_url);

        Self {
            keys,
            jwks_url,
            leeway_seconds,
        }
    }

    pub async fn verify(
        &self,
        token: &str,
        expected_issuer: &str,
        expected_audience: &str,
    ) -> Result<Claims, VerifyError> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| VerifyError::Malformed("missing 'kid' header".into()))?;

        let keys = self.keys.fetch(&self.jwks_url).await?;
        let key = keys
            .find(kid)
            .ok_or_else(|| VerifyError::UnknownKey(kid.to_string()))?;

        if !key.accepts(header.alg) {
            debug!(kid = %kid, alg = ?header.alg, pinned = ?key.algorithm(), "alg not accepted by key");
            return Err(VerifyError::AlgorithmMismatch {
                kid: kid.to_string(),
                alg: header.alg,
            });
        }

        let raw = verify_signature(token, key, header.alg)?;

        let claims = raw.validate(&ClaimRules {
            issuer: expected_issuer,
            audience: expected_audience,
            leeway_seconds: i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX),
            now: chrono::Utc::now().timestamp(),
        })?;

        debug!(kid = %kid, sub = %claims.subject, "access token verified");
        Ok(claims)
    }
}

fn decode_header(token: &str) -> Result<Header, VerifyError> {
    if token.split('.').count() != 3 {
        return Err(VerifyError::Malformed(
            "expected three dot-separated segments".into(),
        ));
    }

    jsonwebtoken::decode_header(token)
        .map_err(|e| VerifyError::Malformed(format!("invalid header: {e}")))
}

// Signature only: every claim check is switched off here and done by
// `RawClaims::validate` so failures can name the claim.
fn verify_signature(
    token: &str,
    key: &VerificationKey,
    alg: Algorithm,
) -> Result<RawClaims, VerifyError> {
    let mut validation = Validation::new(alg);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;

    jsonwebtoken::decode::<RawClaims>(token, key.decoding_key(), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => VerifyError::BadSignature,
            ErrorKind::InvalidAlgorithm => VerifyError::AlgorithmMismatch {
                kid: key.kid().to_string(),
                alg,
            },
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => VerifyError::Malformed(format!("invalid payload: {e}")),
            _ => {
                debug!(kid = %key.kid(), error = %e, "signature verification error");
                VerifyError::BadSignature
            }
        })
}
