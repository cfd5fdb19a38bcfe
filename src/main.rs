use actix_web::middleware::{NormalizePath, from_fn};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use std::time::Duration;

mod api;
mod auth;
mod cache;
mod config;
mod constants;
mod db;
mod docs;
mod errors;
mod model;
mod models;
mod routes;
mod session;
mod store;
mod utils;

use config::Config;
use db::init_store;
use session::{SessionRegistry, session_middleware};

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

/// `rsvp-natal hash-password <password>` prints an argon2 hash for seeding
/// `admin_users`.
fn hash_password_command(password: Option<String>) -> anyhow::Result<()> {
    let password = password.context("usage: rsvp-natal hash-password <password>")?;
    let hash = auth::password::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?;
    println!("{}", hash);
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        return hash_password_command(args.next());
    }

    // Rolling daily log
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let file_appender = rolling::daily(&log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let config = Config::from_env();
    let store = Data::new(init_store(&config));
    let sessions = Data::new(SessionRegistry::new(
        config.session_storage_dir.clone(),
        Duration::from_secs(config.session_ttl_secs),
    ));

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let config = Data::new(config);

    info!(addr = %server_addr, remote_store = store.is_available(), "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(session_middleware))
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(config.clone())
            .app_data(sessions.clone())
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await
    .context("server error")
}
