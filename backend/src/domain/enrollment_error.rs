//! Failures of the enrollment use-cases.
//!
//! The service is the only producer of the non-storage variants. Storage
//! failures are carried through untouched so adapters can tell a dead
//! connection from a failed query.

use serde_json::json;

use super::Error;
use super::ports::{EnrollmentRepositoryError, define_port_error};

define_port_error! {
    /// Errors returned by the enrollment driving ports.
    pub enum EnrollmentError {
        /// A required identifier was empty.
        MissingIdentifier { field: String } => "{field} is required",
        /// The pair already has an active enrollment.
        DuplicateEnrollment { course_id: String, user_id: String } =>
            "user {user_id} is already enrolled in course {course_id}",
        /// A listing or withdrawal matched no active enrollment.
        NoResults { subject: String } => "no enrollments found for {subject}",
        /// The storage gateway failed.
        Storage { source: EnrollmentRepositoryError } => "{source}",
    }
}

impl From<EnrollmentRepositoryError> for EnrollmentError {
    fn from(value: EnrollmentRepositoryError) -> Self {
        Self::storage(value)
    }
}

impl From<EnrollmentError> for Error {
    fn from(value: EnrollmentError) -> Self {
        match value {
            EnrollmentError::MissingIdentifier { field } => {
                Error::invalid_request(format!("{field} is required")).with_details(json!({
                    "field": field,
                    "code": "missing_identifier",
                }))
            }
            EnrollmentError::DuplicateEnrollment { course_id, user_id } => {
                Error::conflict("student is already enrolled in this course").with_details(json!({
                    "courseId": course_id,
                    "userId": user_id,
                    "code": "duplicate_enrollment",
                }))
            }
            EnrollmentError::NoResults { subject } => {
                Error::not_found(format!("no enrollments found for {subject}"))
                    .with_details(json!({ "code": "no_results" }))
            }
            EnrollmentError::Storage { source } => map_storage_error(source),
        }
    }
}

// Adapter detail stays in the service's storage-failure log; clients only
// learn which class of failure happened.
fn map_storage_error(error: EnrollmentRepositoryError) -> Error {
    match error {
        EnrollmentRepositoryError::Connection { .. } => {
            Error::service_unavailable("enrollment store unavailable")
        }
        EnrollmentRepositoryError::Timeout { .. } => {
            Error::service_unavailable("enrollment store timed out")
        }
        EnrollmentRepositoryError::Query { .. }
        | EnrollmentRepositoryError::UniqueViolation { .. } => {
            Error::internal("enrollment store error")
        }
    }
}
