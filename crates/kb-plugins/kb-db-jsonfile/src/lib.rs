//! # kb-db-jsonfile
//!
//! Flat-file implementation of `BoardStore`: the entire dataset lives in one
//! JSON file `{ "threads": [...], "posts": [...] }` which is rewritten
//! wholesale on every mutation.
//!
//! The naive read-modify-rewrite cycle loses updates under concurrency, so
//! all access goes through a single async mutex that owns the in-memory
//! dataset and the id counters, and every rewrite goes to a temp file that is
//! renamed over the live one. Concurrent creates serialize on the lock and
//! can neither duplicate ids nor clobber each other's writes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use kb_core::error::{AppError, Result};
use kb_core::models::{Category, NewPost, NewThread, Post, Thread};
use kb_core::traits::BoardStore;

/// On-disk layout, matching the persisted state contract.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DbFile {
    threads: Vec<Thread>,
    posts: Vec<Post>,
}

/// Dataset plus id allocators, guarded as one unit.
struct Inner {
    db: DbFile,
    next_thread_id: i64,
    next_post_id: i64,
}

pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating the file with empty collections
    /// when it does not exist yet. Id counters resume from the highest id
    /// found on disk.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await?;
                }
                let db = DbFile::default();
                write_atomic(&path, &db).await?;
                log::info!("created empty board database at {}", path.display());
                db
            }
            Err(err) => return Err(err.into()),
        };

        let next_thread_id = db.threads.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let next_post_id = db.posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;

        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                db,
                next_thread_id,
                next_post_id,
            }),
        })
    }
}

/// Serializes the dataset to a sibling temp file, then renames it over the
/// live file so readers never observe a partial write.
async fn write_atomic(path: &Path, db: &DbFile) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(db)?).await?;
    if let Err(err) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(err.into());
    }
    Ok(())
}

#[async_trait]
impl BoardStore for JsonFileStore {
    async fn list_threads(&self, category: Option<Category>) -> Result<Vec<Thread>> {
        let inner = self.inner.lock().await;
        let mut threads: Vec<Thread> = inner
            .db
            .threads
            .iter()
            .filter(|t| category.is_none_or(|c| t.category == c))
            .cloned()
            .collect();
        threads.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(threads)
    }

    async fn get_thread(&self, id: i64) -> Result<Option<Thread>> {
        let inner = self.inner.lock().await;
        Ok(inner.db.threads.iter().find(|t| t.id == id).cloned())
    }

    async fn list_posts(&self, thread_id: i64) -> Result<Vec<Post>> {
        let inner = self.inner.lock().await;
        let mut posts: Vec<Post> = inner
            .db
            .posts
            .iter()
            .filter(|p| p.thread_id == thread_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(posts)
    }

    async fn create_thread(&self, new: NewThread) -> Result<Thread> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_thread_id;
        inner.next_thread_id += 1;

        let thread = Thread {
            id,
            title: new.title,
            author: new.author,
            category: new.category,
            image_path: new.image_path,
            created_at: Utc::now(),
        };
        inner.db.threads.push(thread.clone());
        write_atomic(&self.path, &inner.db).await?;
        Ok(thread)
    }

    async fn create_post(&self, new: NewPost) -> Result<Post> {
        let mut inner = self.inner.lock().await;
        if !inner.db.threads.iter().any(|t| t.id == new.thread_id) {
            return Err(AppError::NotFound("thread", new.thread_id));
        }
        let id = inner.next_post_id;
        inner.next_post_id += 1;

        let post = Post {
            id,
            thread_id: new.thread_id,
            author: new.author,
            body: new.body,
            image_path: new.image_path,
            created_at: Utc::now(),
        };
        inner.db.posts.push(post.clone());
        write_atomic(&self.path, &inner.db).await?;
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn new_thread(title: &str, category: Category) -> NewThread {
        NewThread {
            title: title.to_string(),
            author: "tester".to_string(),
            category,
            image_path: None,
        }
    }

    fn new_post(thread_id: i64, body: &str) -> NewPost {
        NewPost {
            thread_id,
            author: "tester".to_string(),
            body: body.to_string(),
            image_path: None,
        }
    }

    #[tokio::test]
    async fn creates_file_with_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        assert!(path.exists());
        assert!(store.list_threads(None).await.unwrap().is_empty());

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["threads"], serde_json::json!([]));
        assert_eq!(raw["posts"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn thread_ids_start_at_one_and_increase() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();

        let t1 = store.create_thread(new_thread("a", Category::Chat)).await.unwrap();
        let t2 = store.create_thread(new_thread("b", Category::Chat)).await.unwrap();
        assert_eq!(t1.id, 1);
        assert_eq!(t2.id, 2);
    }

    #[tokio::test]
    async fn threads_list_newest_first_and_filter_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();

        store.create_thread(new_thread("chat", Category::Chat)).await.unwrap();
        let news = store.create_thread(new_thread("news", Category::News)).await.unwrap();
        let prog = store
            .create_thread(new_thread("prog", Category::Programming))
            .await
            .unwrap();

        let all = store.list_threads(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, prog.id);
        assert_eq!(all[2].title, "chat");

        let filtered = store.list_threads(Some(Category::News)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, news.id);
    }

    #[tokio::test]
    async fn posts_list_oldest_first_with_global_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();

        let t1 = store.create_thread(new_thread("a", Category::Chat)).await.unwrap();
        let t2 = store.create_thread(new_thread("b", Category::Chat)).await.unwrap();

        let p1 = store.create_post(new_post(t1.id, "one")).await.unwrap();
        let p2 = store.create_post(new_post(t2.id, "other thread")).await.unwrap();
        let p3 = store.create_post(new_post(t1.id, "two")).await.unwrap();

        // Post ids are global across threads, not per-thread.
        assert_eq!((p1.id, p2.id, p3.id), (1, 2, 3));

        let posts = store.list_posts(t1.id).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].body, "one");
        assert_eq!(posts[1].body, "two");
    }

    #[tokio::test]
    async fn listing_posts_of_unknown_thread_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();
        assert!(store.list_posts(12345).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn posting_to_unknown_thread_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();
        let err = store.create_post(new_post(7, "ghost")).await;
        assert!(matches!(err, Err(AppError::NotFound("thread", 7))));
    }

    #[tokio::test]
    async fn get_thread_finds_by_exact_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();
        let t = store.create_thread(new_thread("a", Category::Chat)).await.unwrap();

        assert_eq!(store.get_thread(t.id).await.unwrap().unwrap().title, "a");
        assert!(store.get_thread(t.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn data_and_id_counters_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            let t = store.create_thread(new_thread("kept", Category::Chat)).await.unwrap();
            store.create_post(new_post(t.id, "kept post")).await.unwrap();
        }

        let store = JsonFileStore::open(&path).await.unwrap();
        let threads = store.list_threads(None).await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].title, "kept");

        let t2 = store.create_thread(new_thread("next", Category::Chat)).await.unwrap();
        assert_eq!(t2.id, threads[0].id + 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_unique_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::open(dir.path().join("db.json")).await.unwrap());

        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .create_thread(new_thread(&format!("t{i}"), Category::Chat))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = HashSet::new();
        for task in tasks {
            assert!(ids.insert(task.await.unwrap()));
        }
        assert_eq!(ids.len(), 16);

        // Nothing was lost to a racing rewrite either.
        assert_eq!(store.list_threads(None).await.unwrap().len(), 16);
    }
}
