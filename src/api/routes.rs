/*
 * Responsibility
 * - URL layout of the demo API
 * - The auth middleware is applied to the whole router in app.rs, not per route
 */
use axum::{Router, routing::get};

use crate::api::handlers::subject::subject;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/subject", get(subject))
}
