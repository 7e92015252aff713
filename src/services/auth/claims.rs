use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::services::auth::VerifyError;

/// Registered claim names, used to report which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisteredClaim {
    Subject,
    Issuer,
    Audience,
    Expiration,
    NotBefore,
    IssuedAt,
}

impl fmt::Display for RegisteredClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subject => "sub",
            Self::Issuer => "iss",
            Self::Audience => "aud",
            Self::Expiration => "exp",
            Self::NotBefore => "nbf",
            Self::IssuedAt => "iat",
        };
        f.write_str(name)
    }
}

/// Verified token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub not_before: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
}

// `aud` in JWT can be either a string or an array of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl From<Audience> for Vec<String> {
    fn from(aud: Audience) -> Self {
        match aud {
            Audience::One(one) => vec![one],
            Audience::Many(many) => many,
        }
    }
}

/// Payload as decoded, before any claim is checked.
///
/// Every registered claim is optional here so that a missing one is reported
/// as a claim failure rather than a decoding error. NumericDate values may be
/// fractional.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<Audience>,
    #[serde(default)]
    exp: Option<f64>,
    #[serde(default)]
    nbf: Option<f64>,
    #[serde(default)]
    iat: Option<f64>,
}

/// What a token must satisfy, evaluated at `now` (unix seconds).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClaimRules<'a> {
    pub issuer: &'a str,
    pub audience: &'a str,
    pub leeway_seconds: i64,
    pub now: i64,
}

fn invalid(claim: RegisteredClaim, reason: &'static str) -> VerifyError {
    VerifyError::ClaimInvalid { claim, reason }
}

fn required<T>(value: Option<T>, claim: RegisteredClaim) -> Result<T, VerifyError> {
    value.ok_or_else(|| invalid(claim, "missing"))
}

fn instant(value: f64, claim: RegisteredClaim) -> Result<DateTime<Utc>, VerifyError> {
    if !value.is_finite() {
        return Err(invalid(claim, "not a NumericDate"));
    }
    DateTime::from_timestamp(value.floor() as i64, 0).ok_or_else(|| invalid(claim, "out of range"))
}

impl RawClaims {
    pub(crate) fn validate(self, rules: &ClaimRules<'_>) -> Result<Claims, VerifyError> {
        let subject = required(self.sub, RegisteredClaim::Subject)?;
        if subject.is_empty() {
            return Err(invalid(RegisteredClaim::Subject, "empty"));
        }

        let issuer = required(self.iss, RegisteredClaim::Issuer)?;
        if issuer != rules.issuer {
            return Err(invalid(RegisteredClaim::Issuer, "unexpected issuer"));
        }

        let audience: Vec<String> = required(self.aud, RegisteredClaim::Audience)?.into();
        if !audience.iter().any(|aud| aud == rules.audience) {
            return Err(invalid(RegisteredClaim::Audience, "expected audience not present"));
        }

        let expires_at = instant(
            required(self.exp, RegisteredClaim::Expiration)?,
            RegisteredClaim::Expiration,
        )?;
        if expires_at.timestamp().saturating_add(rules.leeway_seconds) <= rules.now {
            return Err(invalid(RegisteredClaim::Expiration, "token has expired"));
        }

        let not_before = self
            .nbf
            .map(|nbf| instant(nbf, RegisteredClaim::NotBefore))
            .transpose()?;
        if let Some(nbf) = not_before
            && nbf.timestamp() > rules.now.saturating_add(rules.leeway_seconds)
        {
            return Err(invalid(RegisteredClaim::NotBefore, "token is not valid yet"));
        }

        let issued_at = self
            .iat
            .map(|iat| instant(iat, RegisteredClaim::IssuedAt))
            .transpose()?;
        if let Some(iat) = issued_at
            && iat.timestamp() > rules.now.saturating_add(rules.leeway_seconds)
        {
            return Err(invalid(RegisteredClaim::IssuedAt, "issued in the future"));
        }

        Ok(Claims {
            subject,
            issuer,
            audience,
            expires_at,
            not_before,
            issued_at,
        })
    }
}
