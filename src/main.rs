use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{get, App, HttpServer, Responder};
use dotenvy::dotenv;

mod api;
mod config;
mod core;
mod db;
mod docs;
mod model;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::core::cache::LedgerCache;
use crate::core::clock::SystemClock;
use crate::core::logical_day::LogicalDay;
use crate::core::notifier::Notifier;
use crate::core::provisioner::MonthProvisioner;
use crate::core::reconciler::Reconciler;
use crate::core::rules::Rules;
use crate::core::sync;
use crate::docs::ApiDoc;
use crate::utils::punch_filter;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Pointage service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let rules = Rules::from_config(&config);
    let cache = Arc::new(LedgerCache::new(
        Duration::from_secs(config.cache_ttl_current_secs),
        Duration::from_secs(config.cache_ttl_closed_secs),
    ));
    let provisioner = Arc::new(MonthProvisioner::new(pool.clone()));
    let notifier = Arc::new(Notifier::new(pool.clone()));
    let recon = Data::new(Reconciler::new(
        pool.clone(),
        provisioner,
        cache,
        notifier,
        Arc::new(SystemClock),
        rules,
    ));

    let pool_for_filter_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = punch_filter::warmup_punch_filter(&pool_for_filter_warmup, 500).await {
            eprintln!("Failed to warmup punch filter: {:?}", e);
        }
    });

    // Keep the open logical day reconciled even when nobody is mutating.
    let recon_for_sync = recon.clone();
    let sync_interval = Duration::from_secs(config.sync_interval_secs);
    let sync_min_gap = Duration::from_secs(config.sync_min_gap_secs);
    actix_web::rt::spawn(async move {
        loop {
            tokio::time::sleep(sync_interval).await;
            let day = LogicalDay::containing(recon_for_sync.clock().now());
            if let Err(e) = sync::run(&recon_for_sync, day, sync_min_gap).await {
                tracing::error!(error = %e, day = %day, "Background sync failed");
            }
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(recon.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
