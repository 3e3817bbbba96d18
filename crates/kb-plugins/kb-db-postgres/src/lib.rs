//! # kb-db-postgres
//!
//! PostgreSQL implementation of `BoardStore`. Each operation maps to one
//! parameterized statement; id uniqueness comes from `BIGSERIAL` keys and
//! insert atomicity from the engine, so no explicit transactions span
//! multiple statements.
//!
//! Failure semantics: query failures never escape with their cause attached.
//! The original error is logged here and callers receive the generic
//! `AppError::Storage`, which the API layer turns into a plain 500. A
//! foreign-key violation on `create_post` is the one classified case: it
//! means the thread does not exist and surfaces as `NotFound`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use kb_core::error::{AppError, Result};
use kb_core::models::{Category, NewPost, NewThread, Post, Thread};
use kb_core::traits::BoardStore;

/// Postgres `foreign_key_violation` SQLSTATE.
const FK_VIOLATION: &str = "23503";

pub struct PgBoardStore {
    pool: PgPool,
}

impl PgBoardStore {
    /// Connects to the database and applies the embedded migrations.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }
}

#[derive(sqlx::FromRow)]
struct ThreadRow {
    id: i64,
    title: String,
    author: String,
    category: String,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    thread_id: i64,
    author: String,
    body: String,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ThreadRow> for Thread {
    type Error = AppError;

    fn try_from(row: ThreadRow) -> Result<Thread> {
        let category = row.category.parse::<Category>().map_err(|()| {
            AppError::Storage(format!(
                "thread {} has unrecognized category {:?}",
                row.id, row.category
            ))
        })?;
        Ok(Thread {
            id: row.id,
            title: row.title,
            author: row.author,
            category,
            image_path: row.image_path,
            created_at: row.created_at,
        })
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Post {
        Post {
            id: row.id,
            thread_id: row.thread_id,
            author: row.author,
            body: row.body,
            image_path: row.image_path,
            created_at: row.created_at,
        }
    }
}

/// Logs the real cause and degrades it to the generic storage error.
fn storage_err(op: &str, err: sqlx::Error) -> AppError {
    log::error!("postgres {op} failed: {err}");
    AppError::Storage(err.to_string())
}

fn is_fk_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(FK_VIOLATION))
}

#[async_trait]
impl BoardStore for PgBoardStore {
    async fn list_threads(&self, category: Option<Category>) -> Result<Vec<Thread>> {
        let query = match category {
            Some(c) => sqlx::query_as::<_, ThreadRow>(
                "SELECT id, title, author, category, image_path, created_at \
                 FROM threads WHERE category = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(c.as_str()),
            None => sqlx::query_as::<_, ThreadRow>(
                "SELECT id, title, author, category, image_path, created_at \
                 FROM threads ORDER BY created_at DESC, id DESC",
            ),
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_err("list_threads", e))?;
        rows.into_iter().map(Thread::try_from).collect()
    }

    async fn get_thread(&self, id: i64) -> Result<Option<Thread>> {
        let row = sqlx::query_as::<_, ThreadRow>(
            "SELECT id, title, author, category, image_path, created_at \
             FROM threads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_err("get_thread", e))?;

        row.map(Thread::try_from).transpose()
    }

    async fn list_posts(&self, thread_id: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            "SELECT id, thread_id, author, body, image_path, created_at \
             FROM posts WHERE thread_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_err("list_posts", e))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn create_thread(&self, new: NewThread) -> Result<Thread> {
        let row = sqlx::query_as::<_, ThreadRow>(
            "INSERT INTO threads (title, author, category, image_path) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, title, author, category, image_path, created_at",
        )
        .bind(&new.title)
        .bind(&new.author)
        .bind(new.category.as_str())
        .bind(&new.image_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_err("create_thread", e))?;

        row.try_into()
    }

    async fn create_post(&self, new: NewPost) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            "INSERT INTO posts (thread_id, author, body, image_path) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, thread_id, author, body, image_path, created_at",
        )
        .bind(new.thread_id)
        .bind(&new.author)
        .bind(&new.body)
        .bind(&new.image_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                AppError::NotFound("thread", new.thread_id)
            } else {
                storage_err("create_post", e)
            }
        })?;

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_row_maps_to_domain() {
        let row = ThreadRow {
            id: 3,
            title: "t".into(),
            author: "a".into(),
            category: "プログラミング".into(),
            image_path: Some("/uploads/x.png".into()),
            created_at: Utc::now(),
        };
        let thread = Thread::try_from(row).unwrap();
        assert_eq!(thread.category, Category::Programming);
        assert_eq!(thread.image_path.as_deref(), Some("/uploads/x.png"));
    }

    #[test]
    fn corrupt_category_degrades_to_storage_error() {
        let row = ThreadRow {
            id: 9,
            title: "t".into(),
            author: "a".into(),
            category: "sports".into(),
            image_path: None,
            created_at: Utc::now(),
        };
        assert!(matches!(
            Thread::try_from(row),
            Err(AppError::Storage(_))
        ));
    }
}
