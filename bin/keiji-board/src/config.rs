//! Environment-driven configuration.
//!
//! Loaded once at startup after `dotenvy` has populated the process
//! environment. Every knob has a default so the board runs out of the box
//! with the flat-file backend.

use std::env;
use std::path::PathBuf;

use anyhow::bail;

/// Which `BoardStore` implementation to activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    JsonFile,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address to bind, e.g. "127.0.0.1:8080".
    pub bind: String,
    pub backend: StorageBackend,
    /// Flat-file database location (jsonfile backend).
    pub db_file: PathBuf,
    /// Connection URL (postgres backend).
    pub database_url: Option<String>,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: PathBuf,
    /// Public mount path for uploads.
    pub upload_url_prefix: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match var_or("KEIJI_STORAGE", "jsonfile").as_str() {
            "jsonfile" => StorageBackend::JsonFile,
            "postgres" => StorageBackend::Postgres,
            other => bail!("unknown KEIJI_STORAGE value: {other}"),
        };

        Ok(Self {
            bind: var_or("KEIJI_BIND", "127.0.0.1:8080"),
            backend,
            db_file: var_or("KEIJI_DB_FILE", "./data/db.json").into(),
            database_url: env::var("DATABASE_URL").ok(),
            upload_dir: var_or("KEIJI_UPLOAD_DIR", "./data/uploads").into(),
            upload_url_prefix: var_or("KEIJI_UPLOAD_PREFIX", "/uploads"),
        })
    }
}
