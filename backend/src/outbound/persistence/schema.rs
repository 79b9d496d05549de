//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Enrollment records.
    ///
    /// `deleted_at` is the soft delete marker; a partial unique index keeps
    /// at most one row per (course_id, user_id) where it is NULL.
    enrollments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Course identifier issued by the course catalogue.
        course_id -> Varchar,
        /// User identifier issued by the identity service.
        user_id -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
        /// Soft delete marker.
        deleted_at -> Nullable<Timestamptz>,
    }
}
