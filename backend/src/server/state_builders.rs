//! Builders for the HTTP and health state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use enrollments::domain::EnrollmentService;
use enrollments::domain::ports::{EnrollmentRepository, StorageHealth};
use enrollments::inbound::http::health::HealthState;
use enrollments::inbound::http::state::HttpState;
use enrollments::outbound::memory::InMemoryEnrollmentRepository;
use enrollments::outbound::persistence::DieselEnrollmentRepository;

use super::ServerConfig;

/// Application data shared by every worker.
#[derive(Clone)]
pub(crate) struct AppStates {
    pub(crate) http: web::Data<HttpState>,
    pub(crate) health: web::Data<HealthState>,
}

/// Wire the enrollment service and readiness check to Postgres when a pool
/// is configured, otherwise to the in-memory store.
pub(crate) fn build_states(config: &ServerConfig) -> AppStates {
    match &config.db_pool {
        Some(pool) => states_over(Arc::new(
            DieselEnrollmentRepository::new(pool.clone())
                .with_statement_timeout(config.statement_timeout),
        )),
        None => {
            warn!("no database configured; enrollments are kept in memory and lost on restart");
            states_over(Arc::new(InMemoryEnrollmentRepository::new()))
        }
    }
}

fn states_over<R>(repository: Arc<R>) -> AppStates
where
    R: EnrollmentRepository + StorageHealth + 'static,
{
    let health = HealthState::new(repository.clone());
    let service = EnrollmentService::new(repository);
    AppStates {
        http: web::Data::new(HttpState::from_service(Arc::new(service))),
        health: web::Data::new(health),
    }
}
