//! Enrollment API handlers.
//!
//! ```text
//! POST   /enroll {"course_id":"math101","user_id":"alice"}
//! GET    /myCourses?userId=alice
//! GET    /studentsInThisCourse/math101
//! GET    /isEnrolled/math101/alice
//! DELETE /enroll/math101/alice
//! ```
//!
//! Handlers translate transport input into identifiers and delegate to the
//! enrollment driving ports held in [`HttpState`]. Every route sits behind
//! the shared-secret gate.

use actix_web::{HttpRequest, HttpResponse, delete, error::JsonPayloadError, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{
    CourseEnrollment, CourseId, EnrollmentError, Error, StudentEnrollment, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    CourseEnrollmentSchema, ErrorSchema, StudentEnrollmentSchema,
};
use crate::inbound::http::state::HttpState;

/// Request body for `POST /enroll`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EnrollRequest {
    #[schema(example = "math101")]
    pub course_id: String,
    #[schema(example = "alice")]
    pub user_id: String,
}

/// Query string for `GET /myCourses`.
#[derive(Debug, Deserialize)]
pub struct MyCoursesQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Path parameters naming an enrollment pair.
#[derive(Debug, Deserialize)]
pub struct EnrollmentPairPath {
    pub cid: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response body for `GET /isEnrolled/{cid}/{userId}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct IsEnrolledResponse {
    pub enrolled: bool,
}

/// JSON extractor settings turning malformed bodies into `invalid_request`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use enrollments::inbound::http::enrollments::json_config;
///
/// let app = App::new().app_data(json_config());
/// ```
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        debug!(error = %err, "rejected enrollment request body");
        invalid_body(&err).into()
    })
}

fn invalid_body(err: &JsonPayloadError) -> Error {
    let reason = match err {
        JsonPayloadError::ContentType => "content type must be application/json",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "request body is too large"
        }
        _ => "request body must be a JSON object with course_id and user_id",
    };
    Error::invalid_request(reason).with_details(json!({ "code": "invalid_body" }))
}

fn require_course(raw: String, field: &str) -> Result<CourseId, EnrollmentError> {
    let id = CourseId::new(raw);
    if id.is_blank() {
        return Err(EnrollmentError::missing_identifier(field));
    }
    Ok(id)
}

fn require_user(raw: String, field: &str) -> Result<UserId, EnrollmentError> {
    let id = UserId::new(raw);
    if id.is_blank() {
        return Err(EnrollmentError::missing_identifier(field));
    }
    Ok(id)
}

/// Enroll a student in a course.
#[utoipa::path(
    post,
    path = "/enroll",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Student enrolled"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 409, description = "Student already enrolled", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Enrollment store unavailable", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "enrollStudent"
)]
#[post("/enroll")]
pub async fn enroll(
    state: web::Data<HttpState>,
    payload: web::Json<EnrollRequest>,
) -> ApiResult<HttpResponse> {
    let EnrollRequest { course_id, user_id } = payload.into_inner();
    let course_id = require_course(course_id, "course_id")?;
    let user_id = require_user(user_id, "user_id")?;

    state.enrollments.enroll_student(&course_id, &user_id).await?;
    Ok(HttpResponse::Created().finish())
}

/// List the courses a user is enrolled in.
#[utoipa::path(
    get,
    path = "/myCourses",
    params(("userId" = String, Query, description = "User identifier")),
    responses(
        (status = 200, description = "Courses of the user", body = [CourseEnrollmentSchema]),
        (status = 400, description = "Missing userId", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 404, description = "No enrollments found", body = ErrorSchema),
        (status = 503, description = "Enrollment store unavailable", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "listMyCourses"
)]
#[get("/myCourses")]
pub async fn my_courses(
    state: web::Data<HttpState>,
    query: web::Query<MyCoursesQuery>,
) -> ApiResult<web::Json<Vec<CourseEnrollment>>> {
    let user_id = UserId::new(query.into_inner().user_id.unwrap_or_default());
    let courses = state.enrollments_query.list_my_courses(&user_id).await?;
    Ok(web::Json(courses))
}

/// List the students enrolled in a course.
#[utoipa::path(
    get,
    path = "/studentsInThisCourse/{cid}",
    params(("cid" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Students of the course", body = [StudentEnrollmentSchema]),
        (status = 400, description = "Missing course id", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 404, description = "No enrollments found", body = ErrorSchema),
        (status = 503, description = "Enrollment store unavailable", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "listStudentsInCourse"
)]
#[get("/studentsInThisCourse/{cid}")]
pub async fn students_in_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<StudentEnrollment>>> {
    let course_id = CourseId::new(path.into_inner());
    let students = state
        .enrollments_query
        .list_students_in_course(&course_id)
        .await?;
    Ok(web::Json(students))
}

/// Report whether a user is enrolled in a course.
#[utoipa::path(
    get,
    path = "/isEnrolled/{cid}/{userId}",
    params(
        ("cid" = String, Path, description = "Course identifier"),
        ("userId" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Enrollment status", body = IsEnrolledResponse),
        (status = 400, description = "Missing identifier", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 503, description = "Enrollment store unavailable", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "isEnrolled"
)]
#[get("/isEnrolled/{cid}/{userId}")]
pub async fn is_enrolled(
    state: web::Data<HttpState>,
    path: web::Path<EnrollmentPairPath>,
) -> ApiResult<web::Json<IsEnrolledResponse>> {
    let EnrollmentPairPath { cid, user_id } = path.into_inner();
    let course_id = require_course(cid, "courseId")?;
    let user_id = require_user(user_id, "userId")?;

    let enrolled = state
        .enrollments_query
        .is_enrolled(&course_id, &user_id)
        .await?;
    Ok(web::Json(IsEnrolledResponse { enrolled }))
}

/// Withdraw a student from a course.
#[utoipa::path(
    delete,
    path = "/enroll/{cid}/{userId}",
    params(
        ("cid" = String, Path, description = "Course identifier"),
        ("userId" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 204, description = "Enrollment withdrawn"),
        (status = 400, description = "Missing identifier", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 404, description = "No active enrollment", body = ErrorSchema),
        (status = 503, description = "Enrollment store unavailable", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "withdrawStudent"
)]
#[delete("/enroll/{cid}/{userId}")]
pub async fn withdraw(
    state: web::Data<HttpState>,
    path: web::Path<EnrollmentPairPath>,
) -> ApiResult<HttpResponse> {
    let EnrollmentPairPath { cid, user_id } = path.into_inner();
    let course_id = require_course(cid, "courseId")?;
    let user_id = require_user(user_id, "userId")?;

    state
        .enrollments
        .withdraw_student(&course_id, &user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register every enrollment route on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use enrollments::inbound::http::enrollments::configure;
/// use enrollments::inbound::http::state::HttpState;
///
/// let app = App::new()
///     .app_data(web::Data::new(HttpState::fixture()))
///     .configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(enroll)
        .service(my_courses)
        .service(students_in_course)
        .service(is_enrolled)
        .service(withdraw);
}

#[cfg(test)]
#[path = "enrollments_tests.rs"]
mod tests;
