//! Main entry point for the check-in registration server.
//! This crate serves the registration API and, optionally, the scanner frontend.

use std::sync::Arc;

use actix_files::Files;
use actix_web::{
    App, HttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use auth_services::middleware::ApiTokenGuard;
use auth_services::token::ServerSecret;
use postgres::database::*;
use registration_services::{
    CheckinStore, GuestList, JsonFileStore, MemoryStore, PgCheckinStore, RegistrationService,
};
use web_handlers::*;

mod config;
use config::{ServerConfig, StoreKind};

async fn open_store(
    config: &ServerConfig,
) -> Result<Arc<dyn CheckinStore>, Box<dyn std::error::Error + Send + Sync>> {
    match config.store {
        StoreKind::Postgres => {
            let pool =
                create_connection_pool(&config.database_url, config.database_max_connections)
                    .await?;
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            ensure_schema(&pool).await?;
            Ok(Arc::new(PgCheckinStore::new(pool)))
        }
        StoreKind::File => Ok(Arc::new(JsonFileStore::open(&config.data_file).await?)),
        StoreKind::Memory => {
            log::warn!("⚠️ Using in-memory store; check-ins are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn load_secret(config: &ServerConfig) -> Option<ServerSecret> {
    let result = match &config.api_token {
        Some(token) => ServerSecret::new(token),
        None => ServerSecret::from_file(&config.api_token_file),
    };

    match result {
        Ok(secret) => {
            log::info!("🔑 API token loaded");
            Some(secret)
        }
        Err(e) => {
            // Keep serving so clients get a clear 500 instead of a refused connection.
            log::error!("SECURITY ALERT: API token unavailable: {}", e);
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting check-in registration server...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("❌ Failed to open {:?} store: {}", config.store, e);
            if config.store == StoreKind::Postgres {
                log::error!("💡 Check DATABASE_URL or set CHECKIN_STORE=file");
            }
            std::process::exit(1);
        }
    };

    let guest_list = match &config.guest_list_file {
        Some(path) => match GuestList::load(path).await {
            Ok(list) => Some(list),
            Err(e) => {
                log::error!("❌ Failed to load guest list {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let secret = load_secret(&config);
    let service = RegistrationService::new(store, guest_list);
    let allowed_origin = config.allowed_origin.clone();
    let frontend_dir = config.frontend_dir.clone();

    if let Some(dir) = &frontend_dir {
        log::info!("📁 Frontend files location: {}", dir.display());
    }
    log::info!("🌐 Server will be available at: http://{}", config.bind_addr);

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(service.clone()))
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", allowed_origin.clone()))
                    .add(("Access-Control-Allow-Methods", "POST, GET, OPTIONS"))
                    .add(("Access-Control-Allow-Headers", "Content-Type, X-API-Token")),
            )
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api")
                    .wrap(ApiTokenGuard::new(secret.clone()))
                    .configure(configure_registry_routes),
            );

        if let Some(dir) = &frontend_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
