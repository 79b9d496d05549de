//! Driving port for enrollment mutations.

use async_trait::async_trait;

use crate::domain::{CourseId, EnrollmentConfirmation, EnrollmentError, UserId};

/// Use-cases that change enrollment state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Enroll `user_id` in `course_id`, rejecting an existing active pair.
    async fn enroll_student(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<EnrollmentConfirmation, EnrollmentError>;

    /// Soft delete the active enrollment for the pair.
    async fn withdraw_student(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<(), EnrollmentError>;
}

/// Fixture command that accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEnrollmentCommand;

#[async_trait]
impl EnrollmentCommand for FixtureEnrollmentCommand {
    async fn enroll_student(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<EnrollmentConfirmation, EnrollmentError> {
        Ok(EnrollmentConfirmation {
            course_id: course_id.clone(),
            user_id: user_id.clone(),
        })
    }

    async fn withdraw_student(
        &self,
        _course_id: &CourseId,
        _user_id: &UserId,
    ) -> Result<(), EnrollmentError> {
        Ok(())
    }
}
