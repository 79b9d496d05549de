//! Domain primitives, services, and ports.
//!
//! Purpose: hold the enrollment rules and value types independent of HTTP and
//! storage concerns. Inbound adapters call the driving ports in [`ports`];
//! outbound adapters implement the driven [`ports::EnrollmentRepository`].
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic error payload.
//! - Enrollment and friends: the enrollment record and its projections.
//! - EnrollmentService: the use-case implementation over a repository.
//! - TraceId: request-scoped correlation identifier.

pub mod enrollment;
pub mod enrollment_error;
pub mod enrollment_service;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::enrollment::{
    CourseEnrollment, CourseId, Enrollment, EnrollmentConfirmation, EnrollmentId, NewEnrollment,
    StudentEnrollment, UserId,
};
pub use self::enrollment_error::EnrollmentError;
pub use self::enrollment_service::EnrollmentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::TraceId;

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";
