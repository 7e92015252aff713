//! Transport layers shared by every route.
//!
//! Outermost first:
//! 1. layer errors → status codes (408 on timeout)
//! 2. `x-request-id`: set when missing, echoed on the response
//! 3. request body capped at 1 MiB
//! 4. per-request deadline from `Config::request_timeout`
//! 5. access log spans (`TraceLayer`)
//!
//! The deadline covers the auth middleware, so a key set fetch awaited by a
//! request never outlives it. `Config` keeps the fetch timeout shorter.

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const MAX_BODY_BYTES: usize = 1 << 20;

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(layer_error_status))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(config.request_timeout))
            .layer(TraceLayer::new_for_http()),
    )
}

async fn layer_error_status(err: BoxError) -> StatusCode {
    if err.is::<Elapsed>() {
        tracing::warn!("request deadline exceeded");
        return StatusCode::REQUEST_TIMEOUT;
    }

    tracing::error!(error = %err, "middleware layer failed");
    StatusCode::INTERNAL_SERVER_ERROR
}
