/*
 * Responsibility
 * - GET /subject: echo the verified subject
 * - Requests without an identity get the same 401 as a failed verification
 */
use crate::api::extractors::CurrentSubject;
use crate::error::AppError;

pub async fn subject(CurrentSubject(subject): CurrentSubject) -> Result<String, AppError> {
    let subject = subject.ok_or(AppError::Unauthenticated)?;
    Ok(format!("{subject}\n"))
}
