//! Parsed key-set document (RFC 7517 JWK Set).
//!
//! Only public signature keys end up in a [`KeySet`]. Entries that can never
//! verify a token (no `kid`, symmetric, encryption-only, unsupported curve)
//! are skipped while parsing; they do not fail the document.

use std::fmt;

use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum KeySetParseError {
    #[error("invalid key set document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("duplicate kid '{0}' in key set")]
    DuplicateKid(String),
}

#[derive(Debug, Deserialize)]
struct KeySetDocument {
    keys: Vec<serde_json::Value>,
}

/// Key type/curve of a verification key. Used to infer which algorithms a
/// key can verify when the JWK does not pin one with `alg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Rsa,
    EcP256,
    EcP384,
    Ed25519,
}

impl KeyFamily {
    fn of(params: &AlgorithmParameters) -> Option<Self> {
        match params {
            AlgorithmParameters::RSA(_) => Some(Self::Rsa),
            AlgorithmParameters::EllipticCurve(params) => match params.curve {
                EllipticCurve::P256 => Some(Self::EcP256),
                EllipticCurve::P384 => Some(Self::EcP384),
                _ => None,
            },
            AlgorithmParameters::OctetKeyPair(params) => match params.curve {
                EllipticCurve::Ed25519 => Some(Self::Ed25519),
                _ => None,
            },
            // `oct` keys are shared secrets and have no place in a public key set.
            _ => None,
        }
    }

    fn supports(self, alg: Algorithm) -> bool {
        matches!(
            (self, alg),
            (
                Self::Rsa,
                Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512
            ) | (Self::EcP256, Algorithm::ES256)
                | (Self::EcP384, Algorithm::ES384)
                | (Self::Ed25519, Algorithm::EdDSA)
        )
    }
}

/// A single public key usable for signature verification.
///
/// Debug output omits the key material.
#[derive(Clone)]
pub struct VerificationKey {
    kid: String,
    algorithm: Option<Algorithm>,
    family: KeyFamily,
    key: DecodingKey,
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("family", &self.family)
            .finish()
    }
}

impl VerificationKey {
    fn from_value(value: serde_json::Value) -> Option<Self> {
        let jwk: Jwk = match serde_json::from_value(value) {
            Ok(jwk) => jwk,
            Err(err) => {
                debug!(error = %err, "skipping unsupported JWK");
                return None;
            }
        };

        let Some(kid) = jwk.common.key_id.clone() else {
            debug!("skipping JWK without kid");
            return None;
        };

        if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
            debug!(kid = %kid, "skipping encryption JWK");
            return None;
        }

        let Some(family) = KeyFamily::of(&jwk.algorithm) else {
            debug!(kid = %kid, "skipping JWK with unsupported key type");
            return None;
        };

        let algorithm = match jwk.common.key_algorithm.as_ref() {
            None => None,
            Some(declared) => match signature_algorithm(declared) {
                Some(alg) if family.supports(alg) => Some(alg),
                _ => {
                    debug!(kid = %kid, alg = ?declared, "skipping JWK with non-signature alg");
                    return None;
                }
            },
        };

        let key = match DecodingKey::from_jwk(&jwk) {
            Ok(key) => key,
            Err(err) => {
                debug!(kid = %kid, error = %err, "skipping JWK (cannot create DecodingKey)");
                return None;
            }
        };

        Some(Self {
            kid,
            algorithm,
            family,
            key,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The `alg` pinned by the JWK, if any.
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.algorithm
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    /// Whether a token header declaring `alg` may be verified with this key.
    pub fn accepts(&self, alg: Algorithm) -> bool {
        match self.algorithm {
            Some(pinned) => pinned == alg,
            None => self.family.supports(alg),
        }
    }
}

// JWK `alg` values share their names with JWS `alg` values; encryption
// algorithms (RSA-OAEP, ...) have no JWS counterpart and come back as None.
fn signature_algorithm(declared: &KeyAlgorithm) -> Option<Algorithm> {
    let name = serde_json::to_value(declared).ok()?;
    serde_json::from_value(name).ok()
}

/// Immutable, ordered set of verification keys with unique key ids.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: Vec<VerificationKey>,
}

impl KeySet {
    pub fn from_json(document: &[u8]) -> Result<Self, KeySetParseError> {
        let document: KeySetDocument = serde_json::from_slice(document)?;

        let mut keys: Vec<VerificationKey> = Vec::with_capacity(document.keys.len());
        for value in document.keys {
            let Some(key) = VerificationKey::from_value(value) else {
                continue;
            };
            if keys.iter().any(|existing| existing.kid == key.kid) {
                return Err(KeySetParseError::DuplicateKid(key.kid));
            }
            keys.push(key);
        }

        Ok(Self { keys })
    }

    pub fn find(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(VerificationKey::kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
