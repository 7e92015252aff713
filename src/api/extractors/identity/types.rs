/*
 * Responsibility
 * - The verified-identity type handlers see
 * - The middleware verifies and inserts it into request extensions; nothing else can build one
 */

/// Identity attached to a request whose bearer token verified.
///
/// The field is private and the constructor crate-private, so a value found in
/// the extensions always comes from the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    subject: String,
}

impl VerifiedIdentity {
    pub(crate) fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}
