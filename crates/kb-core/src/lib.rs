//! keiji-board/crates/kb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for keiji-board:
//! record model, storage/media ports, error taxonomy, and the thread/post
//! service that validates requests in front of the active store.

pub mod error;
pub mod models;
pub mod service;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use service::*;
pub use traits::*;
