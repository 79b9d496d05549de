//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. The enrollment rules live in the domain service.
//! - **Internal models**: row structs (`models.rs`) and the table definition
//!   (`schema.rs`) never leave this module.
//! - **Bounded calls**: every repository call runs under a statement
//!   deadline and reports a timeout distinctly from query failures.
//! - **Embedded migrations**: the schema ships inside the binary and can be
//!   applied at startup.
//!
//! # Example
//!
//! ```ignore
//! use enrollments::outbound::persistence::{DbPool, DieselEnrollmentRepository, PoolLimits};
//!
//! let pool = DbPool::connect("postgres://localhost/enrollments", PoolLimits::default()).await?;
//! let repo = DieselEnrollmentRepository::new(pool);
//! ```

mod diesel_enrollment_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_enrollment_repository::{DEFAULT_STATEMENT_TIMEOUT, DieselEnrollmentRepository};
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolError, PoolLimits};
