//! Bearer access token verification → `VerifiedIdentity` in request extensions.
//!
//! - No usable `Authorization: Bearer <token>` header: forwarded untouched.
//!   Handlers that need an identity reject on their own.
//! - Token present and valid: identity attached, request forwarded.
//! - Token present and invalid: 401 `unauthenticated`, the error kind is logged.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::{VerifiedIdentity, current_subject};
use crate::error::AppError;
use crate::state::AppState;

/// Applies bearer authentication to every route of `router`.
///
/// ```ignore
/// let router = api::routes();
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // `from_fn` cannot extract State in axum 0.8
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return Ok(next.run(req).await);
    };

    let claims = match state.auth.authenticate(&token).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                kind = err.kind(),
                error = %err,
                "access token verification failed"
            );
            return Err(AppError::Unauthenticated);
        }
    };

    // read back by `current_subject` / `CurrentSubject`
    req.extensions_mut()
        .insert(VerifiedIdentity::new(claims.subject));
    tracing::debug!(sub = current_subject(req.extensions()), "access token accepted");

    Ok(next.run(req).await)
}

/// The token of an `Authorization: Bearer <token>` header.
///
/// Scheme is case-sensitive and followed by exactly one space; the token must
/// be non-empty and contain no whitespace. Anything else counts as "no token".
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
