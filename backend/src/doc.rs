//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the enrollment endpoints and the health endpoints
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`CourseEnrollmentSchema`], [`StudentEnrollmentSchema`]) plus the
//!   request, response and health bodies owned by the HTTP adapter
//! - **Security**: the shared-secret `Authorization` header
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::enrollments::{EnrollRequest, IsEnrolledResponse};
use crate::inbound::http::health::{HealthReport, Phase};
use crate::inbound::http::schemas::{
    CourseEnrollmentSchema, ErrorCodeSchema, ErrorSchema, StudentEnrollmentSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the shared-secret security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Shared secret configured through INSCRIPTION_API_KEY, sent verbatim.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Enrollments API",
        description = "Register students in courses and query who is enrolled where."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("ApiKey" = [])),
    paths(
        crate::inbound::http::enrollments::enroll,
        crate::inbound::http::enrollments::my_courses,
        crate::inbound::http::enrollments::students_in_course,
        crate::inbound::http::enrollments::is_enrolled,
        crate::inbound::http::enrollments::withdraw,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CourseEnrollmentSchema,
        StudentEnrollmentSchema,
        EnrollRequest,
        IsEnrolledResponse,
        HealthReport,
        Phase
    )),
    tags(
        (name = "enrollments", description = "Course enrollment operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
