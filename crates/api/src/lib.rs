mod delivery_workers;
mod device_token;
mod error;
mod notification;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use carepush_infra::CarePushContext;
use delivery_workers::start_delivery_workers;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    device_token::configure_routes(cfg);
    notification::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: CarePushContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        start_delivery_workers(context);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: CarePushContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .configure(configure_server_api)
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
