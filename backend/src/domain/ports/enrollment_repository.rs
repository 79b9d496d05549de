//! Driven port for enrollment persistence.
//!
//! The [`EnrollmentRepository`] trait is the storage gateway: durable creation
//! of enrollment records plus column-equality reads and counts. Adapters only
//! report storage outcomes; they never decide what a result means for the
//! enrollment rules.

use async_trait::async_trait;

use crate::domain::{CourseId, Enrollment, NewEnrollment, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by enrollment repository adapters.
    pub enum EnrollmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "enrollment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "enrollment repository query failed: {message}",
        /// The write collided with a uniqueness constraint.
        UniqueViolation { message: String } =>
            "enrollment repository unique constraint violated: {message}",
        /// The operation did not complete before its deadline.
        Timeout { operation: String } =>
            "enrollment repository operation timed out: {operation}",
    }
}

/// Port for enrollment storage and retrieval.
///
/// Every read ignores soft-deleted records. Listing methods return an empty
/// vector, not an error, when nothing matches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Persist a new record, assigning its identifier and timestamps.
    async fn create(
        &self,
        enrollment: &NewEnrollment,
    ) -> Result<Enrollment, EnrollmentRepositoryError>;

    /// Course identifiers of every active enrollment held by `user_id`,
    /// oldest first.
    async fn list_courses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CourseId>, EnrollmentRepositoryError>;

    /// User identifiers of every active enrollment in `course_id`, oldest
    /// first.
    async fn list_students_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<UserId>, EnrollmentRepositoryError>;

    /// Number of active records for the pair.
    async fn count_enrollment(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError>;

    /// Mark every active record for the pair as deleted, returning how many
    /// rows were marked.
    async fn soft_delete(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError>;
}
