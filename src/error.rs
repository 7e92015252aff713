/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status / plain-text body)
 * - Verification details stay in the logs; clients only ever see the same 401
 */
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

const UNAUTHENTICATED_BODY: &str = "unauthenticated\n";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthenticated")]
    Unauthenticated,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("text/plain; charset=utf-8"),
                    ),
                    (
                        header::X_CONTENT_TYPE_OPTIONS,
                        HeaderValue::from_static("nosniff"),
                    ),
                ],
                UNAUTHENTICATED_BODY,
            )
                .into_response(),
        }
    }
}
