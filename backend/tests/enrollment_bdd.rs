//! Behaviour tests for the enrollment HTTP surface.
//!
//! Each scenario drives the real handlers, middleware and enrollment service
//! over an in-memory repository, so the rules are exercised end to end
//! without a database.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::sync::Arc;

use actix_web::http::{Method, header};
use actix_web::{App, test as actix_test, web};
use enrollments::Trace;
use enrollments::domain::{EnrollmentService, TRACE_ID_HEADER};
use enrollments::inbound::http::enrollments::configure;
use enrollments::inbound::http::health::{HealthState, live, ready};
use enrollments::inbound::http::route_not_found;
use enrollments::inbound::http::state::HttpState;
use enrollments::middleware::{ApiKey, ApiKeyAuth};
use enrollments::outbound::memory::InMemoryEnrollmentRepository;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::{Value, json};


// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

#[derive(Clone)]
struct Recorded {
    status: u16,
    body: Value,
    trace_id: Option<String>,
    allow_origin: Option<String>,
}

#[derive(Default, ScenarioState)]
struct EnrollmentWorld {
    repository: Slot<Arc<InMemoryEnrollmentRepository>>,
    secret: Slot<String>,
    last: Slot<Recorded>,
}

struct RequestSpec {
    method: Method,
    path: String,
    payload: Option<Value>,
    authorised: bool,
    origin: Option<String>,
}

impl RequestSpec {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            payload: None,
            authorised: true,
            origin: None,
        }
    }
}

impl EnrollmentWorld {
    fn send(&self, spec: RequestSpec) {
        let repository = self.repository.get().expect("repository");
        let secret = self.secret.get().expect("secret");
        let key = ApiKey::new(secret.clone()).expect("api key");

        let recorded = actix_rt::System::new().block_on(async move {
            let health = HealthState::new(repository.clone());
            health.mark_ready();
            let service = Arc::new(EnrollmentService::new(repository));
            let app = actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(HttpState::from_service(service)))
                    .app_data(web::Data::new(health))
                    .wrap(ApiKeyAuth::new(key))
                    .wrap(Trace)
                    .configure(configure)
                    .service(ready)
                    .service(live)
                    .default_service(web::to(route_not_found)),
            )
            .await;

            let RequestSpec {
                method,
                path,
                payload,
                authorised,
                origin,
            } = spec;
            let mut request = actix_test::TestRequest::default().method(method).uri(&path);
            if authorised {
                request = request.insert_header((header::AUTHORIZATION, secret));
            }
            if let Some(origin) = origin {
                request = request.insert_header((header::ORIGIN, origin));
            }
            if let Some(payload) = payload {
                request = request.set_json(payload);
            }

            let response = actix_test::call_service(&app, request.to_request()).await;
            let header_value = |name: &str| {
                response
                    .headers()
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
            };
            let status = response.status().as_u16();
            let trace_id = header_value(TRACE_ID_HEADER);
            let allow_origin = header_value(header::ACCESS_CONTROL_ALLOW_ORIGIN.as_str());
            let bytes = actix_test::read_body(response).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("json body")
            };
            Recorded {
                status,
                body,
                trace_id,
                allow_origin,
            }
        });

        self.last.set(recorded);
    }

    fn last(&self) -> Recorded {
        self.last.get().expect("a request was sent")
    }
}

#[fixture]
fn world() -> EnrollmentWorld {
    EnrollmentWorld::default()
}

// -----------------------------------------------------------------------------
// Step Definitions
// -----------------------------------------------------------------------------

#[given("an enrollment service guarded by the secret {secret}")]
fn a_guarded_enrollment_service(world: &EnrollmentWorld, secret: String) {
    world
        .repository
        .set(Arc::new(InMemoryEnrollmentRepository::new()));
    world.secret.set(secret);
}

#[when("{user} is enrolled in {course}")]
fn user_is_enrolled(world: &EnrollmentWorld, user: String, course: String) {
    world.send(RequestSpec {
        method: Method::POST,
        payload: Some(json!({ "course_id": course, "user_id": user })),
        ..RequestSpec::get("/enroll")
    });
}

#[when("{user} is withdrawn from {course}")]
fn user_is_withdrawn(world: &EnrollmentWorld, user: String, course: String) {
    world.send(RequestSpec {
        method: Method::DELETE,
        ..RequestSpec::get(format!("/enroll/{course}/{user}"))
    });
}

#[when("the courses of {user} are listed")]
fn courses_are_listed(world: &EnrollmentWorld, user: String) {
    world.send(RequestSpec::get(format!("/myCourses?userId={user}")));
}

#[when("a caller from {origin} without the secret lists the courses of {user}")]
fn courses_are_listed_anonymously(world: &EnrollmentWorld, origin: String, user: String) {
    world.send(RequestSpec {
        authorised: false,
        origin: Some(origin),
        ..RequestSpec::get(format!("/myCourses?userId={user}"))
    });
}

#[when("the students of {course} are listed")]
fn students_are_listed(world: &EnrollmentWorld, course: String) {
    world.send(RequestSpec::get(format!("/studentsInThisCourse/{course}")));
}

#[when("the enrollment of {user} in {course} is checked")]
fn enrollment_is_checked(world: &EnrollmentWorld, user: String, course: String) {
    world.send(RequestSpec::get(format!("/isEnrolled/{course}/{user}")));
}

#[when("the {check} check is called without the secret")]
fn health_check_is_called(world: &EnrollmentWorld, check: String) {
    let path = match check.as_str() {
        "liveness" => "/health/live",
        "readiness" => "/health/ready",
        other => panic!("unknown health check {other}"),
    };
    world.send(RequestSpec {
        authorised: false,
        ..RequestSpec::get(path)
    });
}

#[then("the health report names the {store} store")]
fn health_report_names_store(world: &EnrollmentWorld, store: String) {
    let last = world.last();
    assert_eq!(last.body["storage"], json!(store));
}

#[when("an unknown route is requested")]
fn unknown_route_is_requested(world: &EnrollmentWorld) {
    world.send(RequestSpec::get("/does/not/exist"));
}

#[then("the response status is {status}")]
fn response_status_is(world: &EnrollmentWorld, status: u16) {
    let last = world.last();
    assert_eq!(last.status, status, "body: {}", last.body);
    assert!(last.trace_id.is_some(), "every response carries a trace id");
}

#[then("the error code is {code}")]
fn error_code_is(world: &EnrollmentWorld, code: String) {
    let last = world.last();
    assert_eq!(last.body["code"], Value::String(code));
    assert_eq!(
        last.body["traceId"].as_str(),
        last.trace_id.as_deref(),
        "envelope trace id matches the header"
    );
}

#[then("the error detail code is {code}")]
fn error_detail_code_is(world: &EnrollmentWorld, code: String) {
    assert_eq!(world.last().body["details"]["code"], Value::String(code));
}

#[then("{count} enrollment rows are stored")]
fn enrollment_rows_are_stored(world: &EnrollmentWorld, count: usize) {
    let repository = world.repository.get().expect("repository");
    assert_eq!(repository.stored_rows(), count);
}

#[then("the response lists {entries}")]
fn response_lists(world: &EnrollmentWorld, entries: String) {
    let body = world.last().body;
    let listed: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|item| item.get("course_id").or_else(|| item.get("user_id")))
        .filter_map(Value::as_str)
        .collect();
    let expected: Vec<&str> = entries.split(',').collect();
    assert_eq!(listed, expected);
}

#[then("the enrollment flag is {flag}")]
fn enrollment_flag_is(world: &EnrollmentWorld, flag: String) {
    let expected = flag == "true";
    assert_eq!(world.last().body, json!({ "enrolled": expected }));
}

#[then("the response allows origin {origin}")]
fn response_allows_origin(world: &EnrollmentWorld, origin: String) {
    assert_eq!(world.last().allow_origin.as_deref(), Some(origin.as_str()));
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Enrolling a student, rejecting the duplicate and reading it back"
)]
fn enroll_duplicate_and_read_back(world: EnrollmentWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Students are listed in enrollment order"
)]
fn students_listed_in_order(world: EnrollmentWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Unknown users and pairs"
)]
fn unknown_users_and_pairs(world: EnrollmentWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Withdrawing hides the enrollment without erasing it"
)]
fn withdrawing_hides_enrollment(world: EnrollmentWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/enrollment.feature",
    name = "Requests without the shared secret are refused"
)]
fn requests_without_secret_are_refused(world: EnrollmentWorld) {
    drop(world);
}

#[scenario(path = "tests/features/enrollment.feature", name = "Unknown routes")]
fn unknown_routes(world: EnrollmentWorld) {
    drop(world);
}
