/*!
 * Verified identity accessor
 *
 * Responsibility:
 * - Hand the identity the auth middleware attached to handlers
 * - Keep axum-specific code in core and the type in types
 *
 * Public API:
 * - VerifiedIdentity
 * - current_subject
 * - CurrentSubject
 */

mod core;
mod types;

pub use core::{CurrentSubject, current_subject};
pub use types::VerifiedIdentity;
