//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    EnrollmentCommand, EnrollmentQuery, FixtureEnrollmentCommand, FixtureEnrollmentQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub enrollments: Arc<dyn EnrollmentCommand>,
    pub enrollments_query: Arc<dyn EnrollmentQuery>,
}

impl HttpState {
    /// Construct state from the enrollment driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use enrollments::domain::ports::{FixtureEnrollmentCommand, FixtureEnrollmentQuery};
    /// use enrollments::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureEnrollmentCommand),
    ///     Arc::new(FixtureEnrollmentQuery),
    /// );
    /// let _query = state.enrollments_query.clone();
    /// ```
    pub fn new(
        enrollments: Arc<dyn EnrollmentCommand>,
        enrollments_query: Arc<dyn EnrollmentQuery>,
    ) -> Self {
        Self {
            enrollments,
            enrollments_query,
        }
    }

    /// Build state from a single service implementing both ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: EnrollmentCommand + EnrollmentQuery + 'static,
    {
        Self {
            enrollments: service.clone(),
            enrollments_query: service,
        }
    }

    /// State wired to the fixture ports.
    pub fn fixture() -> Self {
        Self::new(
            Arc::new(FixtureEnrollmentCommand),
            Arc::new(FixtureEnrollmentQuery),
        )
    }
}
