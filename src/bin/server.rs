use actix_web::{web, App, HttpServer};
use kinesa::config;
use tracing_actix_web::TracingLogger;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = config::Server::load().expect("failed to load configuration");
    let bind = config.http.bind.clone();

    let app = kinesa::App::new(config)
        .await
        .expect("failed to initialize application");

    tracing::info!(%bind, "starting http server");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app.clone()))
            .wrap(TracingLogger::default())
            .configure(kinesa::http::configure)
    })
    .bind(bind.as_str())
    .expect("failed to bind http listener")
    .run()
    .await
    .expect("http server terminated abnormally");
}
