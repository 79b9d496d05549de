//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`EnrollmentCommand`], [`EnrollmentQuery`]) are what the
//! inbound HTTP adapter calls. The driven ports ([`EnrollmentRepository`] and
//! [`StorageHealth`]) are what the domain and health endpoints call and the outbound
//! adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod enrollment_command;
mod enrollment_query;
mod enrollment_repository;
mod storage_health;

#[cfg(test)]
pub use enrollment_command::MockEnrollmentCommand;
pub use enrollment_command::{EnrollmentCommand, FixtureEnrollmentCommand};
#[cfg(test)]
pub use enrollment_query::MockEnrollmentQuery;
pub use enrollment_query::{EnrollmentQuery, FixtureEnrollmentQuery};
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{EnrollmentRepository, EnrollmentRepositoryError};
#[cfg(test)]
pub use storage_health::MockStorageHealth;
pub use storage_health::StorageHealth;
