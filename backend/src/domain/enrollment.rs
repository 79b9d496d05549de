//! Enrollment record and the projections served to clients.
//!
//! Course and user identifiers are opaque strings owned by other services.
//! They are deliberately not validated here; only the listing use-cases
//! reject blank identifiers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! opaque_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier without validation.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// `true` when the identifier is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

opaque_identifier! {
    /// Identifier of a course, as issued by the course catalogue.
    CourseId
}

opaque_identifier! {
    /// Identifier of a user, as issued by the identity service.
    UserId
}

/// Primary key of a persisted enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(Uuid);

impl EnrollmentId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Values supplied when creating an enrollment.
///
/// The repository assigns the identifier and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    pub course_id: CourseId,
    pub user_id: UserId,
}

impl NewEnrollment {
    pub fn new(course_id: CourseId, user_id: UserId) -> Self {
        Self { course_id, user_id }
    }
}

/// A persisted enrollment.
///
/// ## Invariants
/// - `id` never changes once assigned.
/// - Records with `deleted_at` set are invisible to every read path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub course_id: CourseId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// Materialise a freshly created record.
    pub fn created(id: EnrollmentId, new: NewEnrollment, at: DateTime<Utc>) -> Self {
        let NewEnrollment { course_id, user_id } = new;
        Self {
            id,
            course_id,
            user_id,
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    /// `true` while the record has not been soft deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Confirmation returned by a successful enroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentConfirmation {
    pub course_id: CourseId,
    pub user_id: UserId,
}

impl From<Enrollment> for EnrollmentConfirmation {
    fn from(value: Enrollment) -> Self {
        Self {
            course_id: value.course_id,
            user_id: value.user_id,
        }
    }
}

/// One entry of a user's course listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub course_id: CourseId,
}

/// One entry of a course's student listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEnrollment {
    pub user_id: UserId,
}
