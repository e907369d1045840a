use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use evensplit::{api, config::AppConfig, Group};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let state = web::Data::new(api::AppState::new(Group::with_people(&config.seed_people)));
    tracing::info!(
        addr = %config.bind_addr,
        port = config.port,
        people = config.seed_people.len(),
        "starting server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(api::configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
