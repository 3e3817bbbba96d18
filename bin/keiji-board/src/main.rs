//! # keiji-board Binary
//!
//! Assembles the application: loads configuration, activates the configured
//! storage backend, and serves the JSON API plus the uploaded images.

mod config;

use std::sync::Arc;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use anyhow::Context as _;

use kb_api::AppState;
use kb_core::service::BoardService;
use kb_core::traits::{BoardStore, MediaStore};

use config::{AppConfig, StorageBackend};

#[cfg(feature = "db-jsonfile")]
use kb_db_jsonfile::JsonFileStore;

#[cfg(feature = "db-postgres")]
use kb_db_postgres::PgBoardStore;

#[cfg(feature = "media-local")]
use kb_media_local::LocalMediaStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cfg = AppConfig::from_env()?;

    // Exactly one BoardStore is active per deployment.
    let store: Arc<dyn BoardStore> = match cfg.backend {
        #[cfg(feature = "db-jsonfile")]
        StorageBackend::JsonFile => {
            log::info!("using flat-file store at {}", cfg.db_file.display());
            Arc::new(JsonFileStore::open(cfg.db_file.clone()).await?)
        }
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            let url = cfg
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            log::info!("using postgres store");
            Arc::new(PgBoardStore::connect(url).await?)
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("storage backend {other:?} is not compiled in"),
    };

    #[cfg(feature = "media-local")]
    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        cfg.upload_dir.clone(),
        cfg.upload_url_prefix.clone(),
    ));
    #[cfg(not(feature = "media-local"))]
    let media: Arc<dyn MediaStore> = anyhow::bail!("no media store compiled in");

    tokio::fs::create_dir_all(&cfg.upload_dir).await?;

    let state = web::Data::new(AppState {
        service: BoardService::new(store),
        media,
    });

    let upload_dir = cfg.upload_dir.clone();
    let upload_prefix = cfg.upload_url_prefix.clone();

    log::info!("keiji-board listening on http://{}", cfg.bind);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(kb_api::middleware::request_logger())
            .wrap(kb_api::middleware::cors_policy())
            .configure(kb_api::configure_routes)
            .service(Files::new(&upload_prefix, &upload_dir))
    })
    .bind(&cfg.bind)?
    .run()
    .await?;

    Ok(())
}
