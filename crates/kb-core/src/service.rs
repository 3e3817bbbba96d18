//! # BoardService
//!
//! The request-handling layer between the HTTP surface and the active
//! `BoardStore`. Create requests are validated and normalized here; list and
//! get requests pass through unchanged.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Category, NewPost, NewThread, Post, Thread, ANONYMOUS_AUTHOR};
use crate::traits::BoardStore;

/// Unvalidated create-thread request as it arrives from a client.
#[derive(Debug, Default, Clone)]
pub struct CreateThreadInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_path: Option<String>,
}

/// Unvalidated create-post request. The thread id comes from the addressing
/// context, not the body.
#[derive(Debug, Default, Clone)]
pub struct CreatePostInput {
    pub body: Option<String>,
    pub author: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self { store }
    }

    /// Threads newest first, optionally restricted to one category.
    pub async fn list_threads(&self, filter: Option<Category>) -> Result<Vec<Thread>> {
        self.store.list_threads(filter).await
    }

    pub async fn get_thread(&self, id: i64) -> Result<Option<Thread>> {
        self.store.get_thread(id).await
    }

    /// Posts of one thread, oldest first; empty for an unknown thread.
    pub async fn list_posts(&self, thread_id: i64) -> Result<Vec<Post>> {
        self.store.list_posts(thread_id).await
    }

    /// Validates a create-thread request and delegates to the store.
    pub async fn create_thread(&self, input: CreateThreadInput) -> Result<Thread> {
        let title = require_trimmed(input.title.as_deref(), "title is required")?;
        let category = require_trimmed(input.category.as_deref(), "category is required")?
            .parse::<Category>()
            .map_err(|_| AppError::Validation("unknown category".into()))?;

        self.store
            .create_thread(NewThread {
                title,
                author: normalize_author(input.author.as_deref()),
                category,
                image_path: input.image_path,
            })
            .await
    }

    /// Validates a create-post request, inserts it, then re-reads and returns
    /// the full ordered post list for the thread. Clients refresh from this
    /// response, so the full-list shape is part of the contract.
    pub async fn create_post(&self, thread_id: i64, input: CreatePostInput) -> Result<Vec<Post>> {
        let body = require_trimmed(input.body.as_deref(), "body is required")?;

        self.store
            .create_post(NewPost {
                thread_id,
                author: normalize_author(input.author.as_deref()),
                body,
                image_path: input.image_path,
            })
            .await?;

        self.store.list_posts(thread_id).await
    }
}

fn require_trimmed(value: Option<&str>, message: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

fn normalize_author(author: Option<&str>) -> String {
    match author.map(str::trim) {
        Some(a) if !a.is_empty() => a.to_string(),
        _ => ANONYMOUS_AUTHOR.to_string(),
    }
}
