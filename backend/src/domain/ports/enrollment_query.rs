//! Driving port for enrollment reads.

use async_trait::async_trait;

use crate::domain::{CourseEnrollment, CourseId, EnrollmentError, StudentEnrollment, UserId};

/// Read-side enrollment use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentQuery: Send + Sync {
    /// `true` when the pair has an active enrollment.
    async fn is_enrolled(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<bool, EnrollmentError>;

    /// Courses the user is enrolled in, in storage order.
    async fn list_my_courses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CourseEnrollment>, EnrollmentError>;

    /// Students enrolled in the course, in storage order.
    async fn list_students_in_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<StudentEnrollment>, EnrollmentError>;
}

/// Fixture query backed by a single canned enrollment of `alice` in
/// `math101`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEnrollmentQuery;

const FIXTURE_COURSE: &str = "math101";
const FIXTURE_USER: &str = "alice";

#[async_trait]
impl EnrollmentQuery for FixtureEnrollmentQuery {
    async fn is_enrolled(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<bool, EnrollmentError> {
        Ok(course_id.as_str() == FIXTURE_COURSE && user_id.as_str() == FIXTURE_USER)
    }

    async fn list_my_courses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CourseEnrollment>, EnrollmentError> {
        if user_id.as_str() != FIXTURE_USER {
            return Err(EnrollmentError::no_results(format!("user {user_id}")));
        }
        Ok(vec![CourseEnrollment {
            course_id: CourseId::new(FIXTURE_COURSE),
        }])
    }

    async fn list_students_in_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<StudentEnrollment>, EnrollmentError> {
        if course_id.as_str() != FIXTURE_COURSE {
            return Err(EnrollmentError::no_results(format!("course {course_id}")));
        }
        Ok(vec![StudentEnrollment {
            user_id: UserId::new(FIXTURE_USER),
        }])
    }
}
