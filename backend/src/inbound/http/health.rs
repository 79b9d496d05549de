//! Liveness and readiness endpoints.
//!
//! The service moves through three phases: `starting` until the HTTP server
//! is bound, `serving` while it accepts traffic, and `draining` once shutdown
//! begins. Readiness additionally asks the enrollment store whether it can
//! take a request, so a lost database pulls the instance out of rotation
//! without killing it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::StorageHealth;

/// Lifecycle phase reported by both health endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Serving,
    Draining,
}

impl Phase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Starting,
            1 => Self::Serving,
            _ => Self::Draining,
        }
    }
}

/// Body returned by the health endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub phase: Phase,
    /// Backing store, `postgres` or `memory`.
    pub storage: String,
    /// Outcome of the store check; absent when the phase alone decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_ok: Option<bool>,
}

/// Process phase plus the store check used by readiness.
pub struct HealthState {
    phase: AtomicU8,
    storage: Arc<dyn StorageHealth>,
}

impl HealthState {
    /// Start in the `starting` phase, checking `storage` once serving.
    pub fn new(storage: Arc<dyn StorageHealth>) -> Self {
        Self {
            phase: AtomicU8::new(Phase::Starting as u8),
            storage,
        }
    }

    pub fn mark_ready(&self) {
        self.phase.store(Phase::Serving as u8, Ordering::Release);
    }

    /// Fail both health endpoints from now on.
    pub fn mark_draining(&self) {
        self.phase.store(Phase::Draining as u8, Ordering::Release);
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    async fn readiness(&self) -> (bool, HealthReport) {
        let phase = self.phase();
        let storage_ok = if phase == Phase::Serving {
            match self.storage.check().await {
                Ok(()) => Some(true),
                Err(error) => {
                    warn!(%error, backend = self.storage.backend(), "readiness storage check failed");
                    Some(false)
                }
            }
        } else {
            None
        };
        let is_ready = storage_ok == Some(true);
        (is_ready, self.report(phase, storage_ok))
    }

    fn liveness(&self) -> (bool, HealthReport) {
        let phase = self.phase();
        (phase != Phase::Draining, self.report(phase, None))
    }

    fn report(&self, phase: Phase, storage_ok: Option<bool>) -> HealthReport {
        HealthReport {
            phase,
            storage: self.storage.backend().to_owned(),
            storage_ok,
        }
    }
}

fn health_response((passing, report): (bool, HealthReport)) -> HttpResponse {
    let mut response = if passing {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(report)
}

/// Readiness check. 200 while serving with a reachable store, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Serving and the store answers", body = HealthReport),
        (status = 503, description = "Starting, draining, or store unreachable", body = HealthReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    health_response(state.readiness().await)
}

/// Liveness check. 200 until draining starts.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive", body = HealthReport),
        (status = 503, description = "Process is draining", body = HealthReport)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    health_response(state.liveness())
}
