/*
 * Responsibility
 * - Public interface of the middleware layers
 *   - auth::access::apply: bearer token verification
 *   - http::apply: request id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
