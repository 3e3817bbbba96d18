//! # kb-api
//!
//! The web routing and orchestration layer for keiji-board.

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use actix_web::web;
use kb_core::service::BoardService;
use kb_core::traits::MediaStore;

/// State shared across all actix-web workers.
pub struct AppState {
    pub service: BoardService,
    pub media: Arc<dyn MediaStore>,
}

/// Configures the JSON API routes.
///
/// Every resource carries a default service answering 405 with an `Allow`
/// header listing the methods it actually supports.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/threads")
            .route(web::get().to(handlers::list_threads))
            .route(web::post().to(handlers::create_thread))
            .default_service(web::route().to(handlers::allow_get_post)),
    )
    .service(
        web::resource("/threads/{id}")
            .route(web::get().to(handlers::get_thread))
            .default_service(web::route().to(handlers::allow_get)),
    )
    .service(
        web::resource("/posts/{thread_id}")
            .route(web::get().to(handlers::list_posts))
            .route(web::post().to(handlers::create_post))
            .default_service(web::route().to(handlers::allow_get_post)),
    )
    .service(
        web::resource("/upload")
            .route(web::post().to(handlers::upload_image))
            .default_service(web::route().to(handlers::allow_post)),
    );
}
