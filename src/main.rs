use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::{config::Config, error::Error, models::weather::WeatherProvider};

mod config;
mod database;
mod error;
mod models;
mod routes;
mod seed;

fn init_tracing(log_json: bool) {
    // actix's Logger middleware emits `log` records.
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!("log bridge not installed: {error}");
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = if log_json {
        tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json()),
        )
    } else {
        tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer()),
        )
    };
    if let Err(error) = installed {
        eprintln!("tracing subscriber not installed: {error}");
    }
}

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let env_file = config::load_env_file();
    let config: Config = Config::from_env();
    init_tracing(config.log_json);
    if let Some(error) = env_file {
        debug!(%error, ".env file not loaded");
    }
    info!(?config, "configuration loaded");

    let db = web::Data::new(database::connect(&config)?);
    let weather = web::Data::new(WeatherProvider::simulated(config.weather_simulation));

    if config.seed_data {
        match seed::seed(&db, &weather).await {
            Ok(true) => {}
            Ok(false) => info!("store already holds workers, skipping sample data"),
            Err(error) => error!(%error, "seeding sample data failed"),
        }
    }
    info!(
        workers = db.workers.count(|_| true).await,
        schedules = db.schedules.count(|_| true).await,
        safety_records = db.safety_records.count(|_| true).await,
        "store ready"
    );

    let address = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    info!(host = %address.0, port = address.1, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(weather.clone())
            .app_data(config.clone())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await?;
    Ok(())
}
