mod classifier;
mod config;
mod error;
mod handlers;
mod models;
mod preprocess;
mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Cli};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_filter)?)
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::try_from(cli)?;

    info!("Damage classifier v{}", env!("CARGO_PKG_VERSION"));
    info!("  Model path: {:?}", config.model_path);
    info!("  Labels:     {:?}", config.labels.as_slice());
    info!("  Max upload: {} bytes", config.max_upload_bytes);

    let state = web::Data::new(AppState::load(&config));

    info!("Server running at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(handlers::cors())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(config.bind_addr)?
    .run()
    .await?;

    Ok(())
}
