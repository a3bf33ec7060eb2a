//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{AppPorts, build_ports};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use accounts::Trace;
#[cfg(debug_assertions)]
use accounts::doc::ApiDoc;
use accounts::inbound::http::login::login;
use accounts::inbound::http::state::HttpState;
use accounts::inbound::http::users::{create_user, get_user};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(create_user)
        .service(get_user)
        .service(login);

    let app = App::new().app_data(http_state).wrap(Trace).service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server serving the provisioning endpoints.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: &ServerConfig, ports: &AppPorts) -> std::io::Result<Server> {
    let http_state = web::Data::new(HttpState::new(ports.provisioning.clone()));
    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(config.bind_addr)?
        .run();
    Ok(server)
}
