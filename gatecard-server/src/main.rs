#![deny(missing_docs)]
//! gatecard server executable.
//!
//! Receives SonarQube webhooks and relays them to a Feishu bot as cards.

mod config;
mod dispatch;
mod openapi;
mod routes;

#[cfg(not(test))]
use actix_web::{App, HttpServer, web};
#[cfg(not(test))]
use dotenvy::dotenv;

#[cfg(not(test))]
use crate::config::RelayConfig;
#[cfg(not(test))]
use crate::dispatch::CardDispatcher;
#[cfg(not(test))]
use crate::routes::{AppState, healthz, openapi_json, sonar_webhook};

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RelayConfig::from_env().map_err(std::io::Error::other)?;
    let dispatcher = CardDispatcher::from_config(&config).map_err(std::io::Error::other)?;
    if !dispatcher.is_configured() {
        log::warn!(
            "{} is not set; cards will be built but not delivered",
            config::WEBHOOK_ENV
        );
    }

    let state = web::Data::new(AppState {
        dispatcher,
        card_options: config.card_options,
    });
    let listen_addr = config.host.clone();
    let listen_port = config.port;

    actix_web::rt::System::new().block_on(async move {
        let server = HttpServer::new(move || {
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .app_data(state.clone())
                .service(sonar_webhook)
                .service(healthz)
                .service(openapi_json)
        })
        .bind((listen_addr.as_str(), listen_port))?;
        log::info!("listening on {listen_addr}:{listen_port}");
        server.run().await
    })
}

#[cfg(test)]
fn main() {}
