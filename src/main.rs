mod telemetry;

use carepush_api::Application;
use carepush_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("carepush_server".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context().await;

    let app = Application::new(context).await?;
    app.start().await
}
