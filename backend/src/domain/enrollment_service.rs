//! Enrollment domain service.
//!
//! Implements the driving ports on top of an [`EnrollmentRepository`]. The
//! service owns the rule that a (course, user) pair has at most one active
//! enrollment: it checks before inserting, and treats a uniqueness conflict
//! reported by storage as the same duplicate outcome, which covers two
//! concurrent enrolls that both pass the check.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{
    EnrollmentCommand, EnrollmentQuery, EnrollmentRepository, EnrollmentRepositoryError,
};
use crate::domain::{
    CourseEnrollment, CourseId, EnrollmentConfirmation, EnrollmentError, NewEnrollment,
    StudentEnrollment, UserId,
};

/// Stateless enrollment service shared across requests.
#[derive(Clone)]
pub struct EnrollmentService<R> {
    repository: Arc<R>,
}

impl<R> EnrollmentService<R> {
    /// Create a new service over the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> EnrollmentService<R>
where
    R: EnrollmentRepository,
{
    fn storage_failure(
        operation: &'static str,
        error: EnrollmentRepositoryError,
    ) -> EnrollmentError {
        error!(%error, operation, "enrollment storage failure");
        EnrollmentError::from(error)
    }

    fn duplicate(course_id: &CourseId, user_id: &UserId) -> EnrollmentError {
        warn!(%course_id, %user_id, "student already enrolled");
        EnrollmentError::duplicate_enrollment(course_id.as_str(), user_id.as_str())
    }
}

#[async_trait]
impl<R> EnrollmentQuery for EnrollmentService<R>
where
    R: EnrollmentRepository,
{
    async fn is_enrolled(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<bool, EnrollmentError> {
        let count = self
            .repository
            .count_enrollment(course_id, user_id)
            .await
            .map_err(|err| Self::storage_failure("count_enrollment", err))?;
        Ok(count > 0)
    }

    async fn list_my_courses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CourseEnrollment>, EnrollmentError> {
        if user_id.is_blank() {
            warn!("user id is required to list courses");
            return Err(EnrollmentError::missing_identifier("userId"));
        }

        let course_ids = self
            .repository
            .list_courses_for_user(user_id)
            .await
            .map_err(|err| Self::storage_failure("list_courses_for_user", err))?;

        // An unknown user and a user with no enrollments look the same here.
        if course_ids.is_empty() {
            return Err(EnrollmentError::no_results(format!("user {user_id}")));
        }

        info!(%user_id, total_courses = course_ids.len(), "listed courses for user");
        Ok(course_ids
            .into_iter()
            .map(|course_id| CourseEnrollment { course_id })
            .collect())
    }

    async fn list_students_in_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<StudentEnrollment>, EnrollmentError> {
        if course_id.is_blank() {
            warn!("course id is required to list students");
            return Err(EnrollmentError::missing_identifier("courseId"));
        }

        let user_ids = self
            .repository
            .list_students_for_course(course_id)
            .await
            .map_err(|err| Self::storage_failure("list_students_for_course", err))?;

        if user_ids.is_empty() {
            return Err(EnrollmentError::no_results(format!("course {course_id}")));
        }

        info!(%course_id, total_students = user_ids.len(), "listed students for course");
        Ok(user_ids
            .into_iter()
            .map(|user_id| StudentEnrollment { user_id })
            .collect())
    }
}

#[async_trait]
impl<R> EnrollmentCommand for EnrollmentService<R>
where
    R: EnrollmentRepository,
{
    async fn enroll_student(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<EnrollmentConfirmation, EnrollmentError> {
        if self.is_enrolled(course_id, user_id).await? {
            return Err(Self::duplicate(course_id, user_id));
        }

        let new = NewEnrollment::new(course_id.clone(), user_id.clone());
        let created = match self.repository.create(&new).await {
            Ok(created) => created,
            Err(EnrollmentRepositoryError::UniqueViolation { .. }) => {
                return Err(Self::duplicate(course_id, user_id));
            }
            Err(err) => return Err(Self::storage_failure("create", err)),
        };

        info!(
            enrollment_id = %created.id,
            %course_id,
            %user_id,
            "student enrolled"
        );
        Ok(EnrollmentConfirmation::from(created))
    }

    async fn withdraw_student(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<(), EnrollmentError> {
        let marked = self
            .repository
            .soft_delete(course_id, user_id)
            .await
            .map_err(|err| Self::storage_failure("soft_delete", err))?;

        if marked == 0 {
            return Err(EnrollmentError::no_results(format!(
                "user {user_id} in course {course_id}"
            )));
        }

        info!(%course_id, %user_id, marked, "student withdrawn");
        Ok(())
    }
}

#[cfg(test)]
#[path = "enrollment_service_tests.rs"]
mod tests;
