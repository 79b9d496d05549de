//! PostgreSQL-backed `EnrollmentRepository` implementation using Diesel ORM.
//!
//! Every read filters out soft-deleted rows. Each call checks out its own
//! pooled connection and runs under a statement deadline; when the deadline
//! elapses the in-flight future is dropped, which cancels the query, and
//! [`EnrollmentRepositoryError::Timeout`] is returned.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{EnrollmentRepository, EnrollmentRepositoryError, StorageHealth};
use crate::domain::{CourseId, Enrollment, EnrollmentId, NewEnrollment, UserId};

use super::models::{EnrollmentRow, NewEnrollmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::enrollments;

/// Deadline applied to each repository call unless overridden.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Diesel-backed implementation of the `EnrollmentRepository` port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
    statement_timeout: Duration,
}

impl DieselEnrollmentRepository {
    /// Create a repository with the default statement deadline.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    #[must_use]
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, EnrollmentRepositoryError>
    where
        F: Future<Output = Result<T, EnrollmentRepositoryError>>,
    {
        with_deadline(self.statement_timeout, operation, work).await
    }
}

async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &'static str,
    work: F,
) -> Result<T, EnrollmentRepositoryError>
where
    F: Future<Output = Result<T, EnrollmentRepositoryError>>,
{
    match tokio::time::timeout(deadline, work).await {
        Ok(result) => result,
        Err(_) => {
            debug!(operation, ?deadline, "enrollment repository deadline elapsed");
            Err(EnrollmentRepositoryError::timeout(operation))
        }
    }
}

/// Map pool errors to domain enrollment repository errors.
fn map_pool_error(error: PoolError) -> EnrollmentRepositoryError {
    EnrollmentRepositoryError::connection(error.to_string())
}

/// Map Diesel errors to domain enrollment repository errors.
fn map_diesel_error(error: diesel::result::Error) -> EnrollmentRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => EnrollmentRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => {
            EnrollmentRepositoryError::query("database query error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            EnrollmentRepositoryError::unique_violation(
                info.constraint_name().unwrap_or("unknown constraint"),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            EnrollmentRepositoryError::connection("database connection error")
        }
        _ => EnrollmentRepositoryError::query("database error"),
    }
}

fn row_to_enrollment(row: EnrollmentRow) -> Enrollment {
    Enrollment {
        id: EnrollmentId::from_uuid(row.id),
        course_id: CourseId::new(row.course_id),
        user_id: UserId::new(row.user_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    }
}

fn affected_rows(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn create(
        &self,
        enrollment: &NewEnrollment,
    ) -> Result<Enrollment, EnrollmentRepositoryError> {
        self.bounded("create", async {
            let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
            let new_row = NewEnrollmentRow {
                id: Uuid::new_v4(),
                course_id: enrollment.course_id.as_str(),
                user_id: enrollment.user_id.as_str(),
            };

            diesel::insert_into(enrollments::table)
                .values(&new_row)
                .returning(EnrollmentRow::as_returning())
                .get_result(&mut conn)
                .await
                .map(row_to_enrollment)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_courses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CourseId>, EnrollmentRepositoryError> {
        self.bounded("list_courses_for_user", async {
            let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;

            let course_ids: Vec<String> = enrollments::table
                .filter(enrollments::user_id.eq(user_id.as_str()))
                .filter(enrollments::deleted_at.is_null())
                .order((enrollments::created_at.asc(), enrollments::id.asc()))
                .select(enrollments::course_id)
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            Ok(course_ids.into_iter().map(CourseId::new).collect())
        })
        .await
    }

    async fn list_students_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<UserId>, EnrollmentRepositoryError> {
        self.bounded("list_students_for_course", async {
            let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;

            let user_ids: Vec<String> = enrollments::table
                .filter(enrollments::course_id.eq(course_id.as_str()))
                .filter(enrollments::deleted_at.is_null())
                .order((enrollments::created_at.asc(), enrollments::id.asc()))
                .select(enrollments::user_id)
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            Ok(user_ids.into_iter().map(UserId::new).collect())
        })
        .await
    }

    async fn count_enrollment(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError> {
        self.bounded("count_enrollment", async {
            let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;

            let count: i64 = enrollments::table
                .filter(enrollments::course_id.eq(course_id.as_str()))
                .filter(enrollments::user_id.eq(user_id.as_str()))
                .filter(enrollments::deleted_at.is_null())
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    async fn soft_delete(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError> {
        self.bounded("soft_delete", async {
            let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
            let now = Utc::now();

            let marked = diesel::update(
                enrollments::table
                    .filter(enrollments::course_id.eq(course_id.as_str()))
                    .filter(enrollments::user_id.eq(user_id.as_str()))
                    .filter(enrollments::deleted_at.is_null()),
            )
            .set((
                enrollments::deleted_at.eq(Some(now)),
                enrollments::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

            Ok(affected_rows(marked))
        })
        .await
    }
}

#[async_trait]
impl StorageHealth for DieselEnrollmentRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    // bb8 validates a connection on checkout, so a successful checkout means
    // the server answered.
    async fn check(&self) -> Result<(), EnrollmentRepositoryError> {
        self.bounded("check", async {
            let _conn = self.pool.checkout().await.map_err(map_pool_error)?;
            Ok(())
        })
        .await
        .inspect_err(|_| {
            debug!(
                open_connections = self.pool.open_connections(),
                "enrollment store check failed"
            );
        })
    }
}
