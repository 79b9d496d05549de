//! Process-local enrollment store used when no database is configured.
//!
//! Rows live in a vector, so insertion order is creation order. Soft-deleted
//! rows are kept and skipped by every read, and a second active row for a
//! pair is refused with the same constraint name the Postgres schema uses.
//! Nothing survives a restart.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{EnrollmentRepository, EnrollmentRepositoryError, StorageHealth};
use crate::domain::{CourseId, Enrollment, EnrollmentId, NewEnrollment, UserId};

/// Name reported for the partial unique index on active pairs.
pub const ACTIVE_PAIR_CONSTRAINT: &str = "uq_enrollments_active_pair";

/// In-memory implementation of the storage gateway.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentRepository {
    rows: Mutex<Vec<Enrollment>>,
}

impl InMemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, soft-deleted ones included.
    pub fn stored_rows(&self) -> usize {
        self.rows().len()
    }

    // A panic while holding the lock cannot leave a half-written row, so a
    // poisoned guard is still consistent.
    fn rows(&self) -> MutexGuard<'_, Vec<Enrollment>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_active_pair(row: &Enrollment, course_id: &CourseId, user_id: &UserId) -> bool {
    row.is_active() && &row.course_id == course_id && &row.user_id == user_id
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn create(
        &self,
        enrollment: &NewEnrollment,
    ) -> Result<Enrollment, EnrollmentRepositoryError> {
        let mut rows = self.rows();
        if rows
            .iter()
            .any(|row| is_active_pair(row, &enrollment.course_id, &enrollment.user_id))
        {
            return Err(EnrollmentRepositoryError::unique_violation(
                ACTIVE_PAIR_CONSTRAINT,
            ));
        }
        let record = Enrollment::created(EnrollmentId::random(), enrollment.clone(), Utc::now());
        rows.push(record.clone());
        Ok(record)
    }

    async fn list_courses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CourseId>, EnrollmentRepositoryError> {
        Ok(self
            .rows()
            .iter()
            .filter(|row| row.is_active() && &row.user_id == user_id)
            .map(|row| row.course_id.clone())
            .collect())
    }

    async fn list_students_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<UserId>, EnrollmentRepositoryError> {
        Ok(self
            .rows()
            .iter()
            .filter(|row| row.is_active() && &row.course_id == course_id)
            .map(|row| row.user_id.clone())
            .collect())
    }

    async fn count_enrollment(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError> {
        let count = self
            .rows()
            .iter()
            .filter(|row| is_active_pair(row, course_id, user_id))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn soft_delete(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError> {
        let now = Utc::now();
        let mut marked = 0;
        for row in self
            .rows()
            .iter_mut()
            .filter(|row| is_active_pair(row, course_id, user_id))
        {
            row.deleted_at = Some(now);
            row.updated_at = now;
            marked += 1;
        }
        Ok(marked)
    }
}

#[async_trait]
impl StorageHealth for InMemoryEnrollmentRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn check(&self) -> Result<(), EnrollmentRepositoryError> {
        Ok(())
    }
}
