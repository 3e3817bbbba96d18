//! keiji-board/crates/kb-api/src/middleware.rs
//!
//! Standard middleware constructors shared by the binary and the tests.

use actix_cors::Cors;
use actix_web::middleware::Logger;

/// Request logger: remote-ip "request-line" status response-size timing.
pub fn request_logger() -> Logger {
    Logger::default()
}

/// CORS policy for the JSON API. The board is anonymous, so there are no
/// credentials to protect; GET/POST from any origin is acceptable.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600)
}
