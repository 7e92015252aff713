pub mod identity;

pub use identity::{CurrentSubject, VerifiedIdentity, current_subject};
