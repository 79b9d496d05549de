//! Shared-secret gate in front of the enrollment routes.
//!
//! Every request must present the configured secret verbatim in its
//! `Authorization` header. Health endpoints and the API docs are exempt so
//! orchestrators and developers can reach them without the secret.
//! Rejections short-circuit with a 401 error envelope that echoes the
//! caller's `Origin`, letting browser clients read the failure.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::Error as DomainError;

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Path prefixes reachable without the shared secret.
const EXEMPT_PREFIXES: &[&str] = &["/health/", "/docs", "/api-docs/"];

/// Errors raised when building an [`ApiKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiKeyError {
    /// The configured secret was empty or whitespace.
    #[error("API key must not be empty")]
    Empty,
}

/// Shared secret expected in the `Authorization` header.
///
/// The secret lives in a zeroizing buffer and never appears in `Debug`
/// output or logs; use [`ApiKey::fingerprint`] to identify it.
#[derive(Clone)]
pub struct ApiKey {
    secret: Arc<Zeroizing<String>>,
}

impl ApiKey {
    /// Wrap a non-blank secret.
    ///
    /// # Examples
    /// ```
    /// use enrollments::middleware::api_key::ApiKey;
    ///
    /// let key = ApiKey::new("s3cret").expect("non-empty key");
    /// assert!(key.matches("s3cret"));
    /// assert!(!key.matches("S3CRET"));
    /// ```
    pub fn new(secret: impl Into<String>) -> Result<Self, ApiKeyError> {
        let secret = Zeroizing::new(secret.into());
        if secret.trim().is_empty() {
            return Err(ApiKeyError::Empty);
        }
        Ok(Self {
            secret: Arc::new(secret),
        })
    }

    /// `true` when `presented` equals the secret.
    ///
    /// Both sides are hashed first so the comparison does not stop at the
    /// first differing byte of the secret itself.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        let expected = Sha256::digest(self.secret.as_bytes());
        let actual = Sha256::digest(presented.as_bytes());
        expected == actual
    }

    /// First eight bytes of the secret's SHA-256 digest, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.secret.as_bytes());
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

fn is_exempt(path: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Middleware rejecting requests that lack the shared secret.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use enrollments::middleware::api_key::{ApiKey, ApiKeyAuth};
///
/// let key = ApiKey::new("s3cret").expect("non-empty key");
/// let app = App::new().wrap(ApiKeyAuth::new(key));
/// ```
#[derive(Clone)]
pub struct ApiKeyAuth {
    key: ApiKey,
}

impl ApiKeyAuth {
    /// Gate requests on `key`.
    pub fn new(key: ApiKey) -> Self {
        Self { key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            key: self.key.clone(),
        }))
    }
}

/// Service wrapper produced by [`ApiKeyAuth`].
pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    key: ApiKey,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authorised = is_exempt(req.path())
            || req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|presented| self.key.matches(presented));

        if authorised {
            let service = Rc::clone(&self.service);
            return Box::pin(async move {
                let res = service.call(req).await?;
                Ok(res.map_into_left_body())
            });
        }

        let peer = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_owned();
        warn!(peer = %peer, path = %req.path(), "rejected request without valid API key");

        let origin = req.headers().get(header::ORIGIN).cloned();
        let mut response = DomainError::unauthorized("Unauthorized").error_response();
        if let Some(origin) = origin {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }

        Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::BoxBody;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::{fixture, rstest};
    use serde_json::Value;

    use crate::domain::TRACE_ID_HEADER;
    use crate::middleware::Trace;

    const SECRET: &str = "letmein";

    #[fixture]
    fn key() -> ApiKey {
        ApiKey::new(SECRET).expect("non-empty key")
    }

    async fn call(key: ApiKey, req: actix_test::TestRequest) -> ServiceResponse<EitherBody<BoxBody>> {
        let app = actix_test::init_service(
            App::new()
                .wrap(ApiKeyAuth::new(key))
                .route("/myCourses", web::get().to(|| async { HttpResponse::Ok().finish() }))
                .route(
                    "/health/live",
                    web::get().to(|| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;
        actix_test::call_service(&app, req.to_request()).await
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_secret_is_rejected(#[case] secret: &str) {
        assert_eq!(ApiKey::new(secret).err(), Some(ApiKeyError::Empty));
    }

    #[rstest]
    fn fingerprint_is_short_hex_and_hides_secret(key: ApiKey) {
        let fp = key.fingerprint();

        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!format!("{key:?}").contains(SECRET));
    }

    #[rstest]
    #[actix_web::test]
    async fn matching_secret_passes_through(key: ApiKey) {
        let req = actix_test::TestRequest::get()
            .uri("/myCourses")
            .insert_header((header::AUTHORIZATION, SECRET));

        let res = call(key, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("wrong"))]
    #[case(Some("Bearer letmein"))]
    #[actix_web::test]
    async fn missing_or_wrong_secret_is_unauthorised(key: ApiKey, #[case] presented: Option<&str>) {
        let mut req = actix_test::TestRequest::get().uri("/myCourses");
        if let Some(value) = presented {
            req = req.insert_header((header::AUTHORIZATION, value));
        }

        let res = call(key, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("code").and_then(Value::as_str), Some("unauthorized"));
    }

    #[rstest]
    #[actix_web::test]
    async fn rejection_echoes_origin_for_cors(key: ApiKey) {
        let req = actix_test::TestRequest::get()
            .uri("/myCourses")
            .insert_header((header::ORIGIN, "https://school.example"));

        let res = call(key, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://school.example")
        );
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn rejection_body_carries_the_trace_id(key: ApiKey) {
        let app = actix_test::init_service(
            App::new()
                .wrap(ApiKeyAuth::new(key))
                .wrap(Trace)
                .route("/myCourses", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/myCourses").to_request())
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let header_id = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .expect("trace id header");
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("traceId").and_then(Value::as_str), Some(header_id.as_str()));
    }

    #[rstest]
    #[actix_web::test]
    async fn health_endpoints_bypass_the_gate(key: ApiKey) {
        let res = call(key, actix_test::TestRequest::get().uri("/health/live")).await;

        assert_eq!(res.status(), StatusCode::OK);
    }
}
