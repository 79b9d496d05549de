//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AppStates, build_states};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use enrollments::Trace;
#[cfg(debug_assertions)]
use enrollments::doc::ApiDoc;
use enrollments::inbound::http::enrollments::configure;
use enrollments::inbound::http::health::{HealthState, live, ready};
use enrollments::inbound::http::route_not_found;
use enrollments::middleware::{ApiKey, ApiKeyAuth};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    states: AppStates,
    api_key: ApiKey,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(states.health)
        .app_data(states.http)
        .wrap(ApiKeyAuth::new(api_key))
        .wrap(Trace)
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(route_not_found))
}

/// Bind the HTTP server and mark it ready.
///
/// Returns the running server together with its health state so the caller
/// can mark it draining once the server stops.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<(Server, web::Data<HealthState>)> {
    let states = build_states(&config);
    let health_state = states.health.clone();
    let ServerConfig {
        api_key,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || build_app(states.clone(), api_key.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok((server, health_state))
}
