//! # kb-media-local
//!
//! Local filesystem implementation of `MediaStore`. Validates the payload
//! before anything touches disk, writes to a temp path inside the upload
//! directory, and renames into the final location so a crash never leaves a
//! half-written file behind under its public name.
//!
//! File names are a millisecond timestamp plus a random alphanumeric suffix,
//! so references are collision-resistant and not guessable from the clock
//! alone. The returned reference (`<prefix>/<name>`) is opaque to the rest
//! of the system.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use mime::Mime;
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::fs;

use kb_core::error::{AppError, Result};
use kb_core::traits::{MediaStore, MAX_IMAGE_BYTES};

const SUFFIX_LEN: usize = 7;

pub struct LocalMediaStore {
    /// Directory uploads are written to (e.g. "./data/uploads").
    root_path: PathBuf,
    /// Public URL prefix the binary serves that directory under.
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn random_suffix() -> String {
        rand::rng()
            .sample_iter(Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect()
    }
}

/// Maps an allow-listed media type to the stored file extension.
fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime: Mime = content_type.parse().ok()?;
    if mime.type_() != mime::IMAGE {
        return None;
    }
    match mime.subtype().as_str() {
        "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "webp" => Some("webp"),
        _ => None,
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_upload(&self, data: &[u8], content_type: &str) -> Result<String> {
        let ext = extension_for(content_type).ok_or_else(|| {
            AppError::UploadRejected(format!("unsupported media type: {content_type}"))
        })?;
        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::UploadRejected(
                "image exceeds the 5 MiB limit".to_string(),
            ));
        }

        fs::create_dir_all(&self.root_path).await?;

        let name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Self::random_suffix(),
            ext
        );
        let tmp_path = self.root_path.join(format!(".{name}.part"));
        let final_path = self.root_path.join(&name);

        fs::write(&tmp_path, data).await?;
        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            // Do not leave the partial file behind on a failed publish.
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        log::debug!("stored upload {name} ({} bytes)", data.len());
        Ok(format!("{}/{}", self.url_prefix, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &std::path::Path) -> LocalMediaStore {
        LocalMediaStore::new(dir.to_path_buf(), "/uploads".to_string())
    }

    #[tokio::test]
    async fn accepts_png_and_returns_servable_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let data = vec![0u8; 1024 * 1024];
        let url = store.save_upload(&data, "image/png").await.unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.strip_prefix("/uploads/").unwrap();
        let on_disk = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(on_disk.len(), data.len());
    }

    #[tokio::test]
    async fn rejects_oversize_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let data = vec![0u8; 6 * 1024 * 1024];
        let err = store.save_upload(&data, "image/jpeg").await;
        assert!(matches!(err, Err(AppError::UploadRejected(_))));

        // Nothing was written, not even a temp file.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn rejects_disallowed_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        for content_type in ["image/gif", "text/plain", "application/pdf", "garbage"] {
            let err = store.save_upload(b"x", content_type).await;
            assert!(matches!(err, Err(AppError::UploadRejected(_))), "{content_type}");
        }
    }

    #[tokio::test]
    async fn consecutive_uploads_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let a = store.save_upload(b"a", "image/webp").await.unwrap();
        let b = store.save_upload(b"b", "image/webp").await.unwrap();
        assert_ne!(a, b);
        assert!(a.ends_with(".webp"));
    }

    #[test]
    fn jpeg_maps_to_jpg_extension() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/svg+xml"), None);
    }
}
