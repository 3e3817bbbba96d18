//! # Core Traits (Ports)
//!
//! Any storage or media plugin must implement these traits to be wired into
//! the binary. Callers depend on the operation contract only; exactly one
//! `BoardStore` implementation is active per deployment.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Category, NewPost, NewThread, Post, Thread};

/// Hard ceiling for a single uploaded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Media types the upload side-channel accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Data persistence contract for threads and posts.
///
/// Ordering is part of the contract: `list_threads` returns newest
/// `created_at` first, `list_posts` oldest first, ties broken by id so the
/// result is totally ordered even when two records share a timestamp.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// All threads, or only those whose category equals the filter exactly.
    async fn list_threads(&self, category: Option<Category>) -> Result<Vec<Thread>>;

    /// Exact-id lookup, no side effects.
    async fn get_thread(&self, id: i64) -> Result<Option<Thread>>;

    /// Posts of one thread, oldest first. Empty when the thread has no posts
    /// or does not exist; absence is not an error at this layer.
    async fn list_posts(&self, thread_id: i64) -> Result<Vec<Post>>;

    /// Persists a new thread, assigning the next id (max + 1, or 1 when the
    /// collection is empty) and the current time. Returns the stored record.
    async fn create_thread(&self, new: NewThread) -> Result<Thread>;

    /// Persists a new post. Ids are scoped across all posts, not per thread.
    /// Fails with `AppError::NotFound` when `thread_id` matches no thread.
    async fn create_post(&self, new: NewPost) -> Result<Post>;
}

/// Upload side-channel contract.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Validates type and size, persists the payload, and returns a stable
    /// reference path. The reference is opaque to the service and the store;
    /// they pass it around verbatim as `image_path`.
    async fn save_upload(&self, data: &[u8], content_type: &str) -> Result<String>;
}
