use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use chrono::Duration;
use std::io;
use std::sync::Arc;

use ecom_backend::auth::CredentialService;
use ecom_backend::config::Config;
use ecom_backend::db;
use ecom_backend::store::{MemoryStore, RecordStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok(); // Load environment variables from .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let store = db::connect(url, &config.database_name)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let store = web::Data::from(store);

    let credentials = CredentialService::with_ttl(
        &config.jwt_secret,
        Duration::hours(config.token_ttl_hours),
    );

    log::info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| ecom_backend::configure(cfg, store.clone(), credentials.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
