pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod obfuscate_errors;
pub mod panic_handler;
pub mod routes;
pub mod shared_state;
pub mod tracing_config;

pub use error::{Error, Result};

use axum::{routing::IntoMakeService, Router};
use hyper::server::conn::AddrIncoming;
use ideaboard_db::Database;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

use crate::{obfuscate_errors::ObfuscateErrorLayer, shared_state::InnerState};

pub struct Server {
    pub host: String,
    pub port: u16,
    pub state: shared_state::AppState,
    server: axum::Server<AddrIncoming, IntoMakeService<Router>>,
}

impl Server {
    pub async fn run(self) -> Result<(), Error> {
        self.server.await.map_err(Error::ServerError)
    }
}

pub fn build_app(state: shared_state::AppState) -> Router {
    let production = state.production;

    routes::configure_routes().with_state(state).layer(
        // Global middlewares
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(move |err| {
                panic_handler::handle_panic(production, err)
            }))
            .layer(ObfuscateErrorLayer::new(production))
            .set_x_request_id(MakeRequestUuid)
            .propagate_x_request_id()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO)),
            )
            .into_inner(),
    )
}

/// Set up the store and bind the listener. The server does not accept connections until
/// [Server::run] is awaited.
pub async fn create_server(config: config::Config) -> Result<Server, anyhow::Error> {
    let production = config.production();
    let state = Arc::new(InnerState::new(Database::new(), production));

    if let Some(path) = config.bootstrap.as_deref() {
        for created in bootstrap::bootstrap_from_file(&state, path)? {
            println!(
                "{}\t{}\t{}",
                created.user.user_id, created.user.email, created.api_key
            );
        }
    }

    let app = build_app(state.clone());

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let server = axum::Server::try_bind(&addr)?.serve(app.into_make_service());
    let port = server.local_addr().port();
    event!(Level::INFO, "Listening on {}:{}", config.host, port);

    Ok(Server {
        host: config.host,
        port,
        state,
        server,
    })
}
