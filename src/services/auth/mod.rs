pub mod access;
pub mod claims;
pub mod error;
pub mod factory;
pub mod verifier;

pub use access::AuthService;
pub use claims::Claims;
pub use error::VerifyError;
pub use factory::build_auth_service;
pub use verifier::TokenVerifier;
