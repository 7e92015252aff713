use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{Extensions, request::Parts};

use super::VerifiedIdentity;

/// Subject of the verified token attached to this request, if any.
pub fn current_subject(extensions: &Extensions) -> Option<&str> {
    extensions
        .get::<VerifiedIdentity>()
        .map(VerifiedIdentity::subject)
}

/// Extractor exposing [`current_subject`] to handlers.
///
/// Never rejects: `None` means the request carried no bearer token and the
/// handler decides what that means for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSubject(pub Option<String>);

impl<S> FromRequestParts<S> for CurrentSubject
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSubject(
            current_subject(&parts.extensions).map(str::to_owned),
        ))
    }
}
