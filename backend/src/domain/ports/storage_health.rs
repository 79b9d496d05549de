//! Driven port reporting whether the enrollment store can take requests.

use async_trait::async_trait;

use super::EnrollmentRepositoryError;

/// Readiness check for the store behind [`super::EnrollmentRepository`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageHealth: Send + Sync {
    /// Short name of the backing store, reported by the readiness endpoint.
    fn backend(&self) -> &'static str;

    /// Succeeds when the store can serve a request now.
    async fn check(&self) -> Result<(), EnrollmentRepositoryError>;
}
