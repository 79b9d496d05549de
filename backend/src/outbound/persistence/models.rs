//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::enrollments;

/// Row struct for reading from the enrollments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrollmentRow {
    pub id: Uuid,
    pub course_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insertable struct for creating enrollment records.
///
/// Timestamps are filled in by column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub(crate) struct NewEnrollmentRow<'a> {
    pub id: Uuid,
    pub course_id: &'a str,
    pub user_id: &'a str,
}
