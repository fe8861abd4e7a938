//! Product image storage.
//!
//! Images live as flat files under a single root directory. Names are generated by
//! [`generate_name`]: `length` characters drawn from a 62-symbol alphabet with the thread-local
//! CSPRNG, so ten characters give 62^10 (about 8.4e17) possible names. Uniqueness is not checked.

use crate::config::MediaConfig;
use async_trait::async_trait;
use rand::prelude::RngExt;
use rand::rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Extensions kept from the uploaded file name; anything else is stored as `.jpg`.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

const DEFAULT_EXTENSION: &str = ".jpg";

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Image {name} not found")]
    NotFound { name: String },

    /// Name would resolve outside the media root
    #[error("Invalid image name '{name}'")]
    InvalidName { name: String },

    #[error("Image storage failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;

/// Trait for image storage backends
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write `content` under `name`, replacing any existing file
    async fn store(&self, name: &str, content: &[u8]) -> Result<()>;

    /// Read the full content stored under `name`
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>>;

    /// Remove `name`; removing a missing file is not an error
    async fn delete(&self, name: &str) -> Result<()>;

    async fn exists(&self, name: &str) -> Result<bool>;
}

/// Local filesystem storage backend - stores images in a directory
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        is_safe_name(name).then(|| self.root.join(name))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.path_for(name).ok_or_else(|| MediaError::InvalidName { name: name.to_string() })?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;

        tracing::debug!(name, bytes = content.len(), "Stored image");
        Ok(())
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        let not_found = || MediaError::NotFound { name: name.to_string() };
        let path = self.path_for(name).ok_or_else(not_found)?;

        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name).ok_or_else(|| MediaError::InvalidName { name: name.to_string() })?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        match self.path_for(name) {
            Some(path) => Ok(fs::try_exists(&path).await?),
            None => Ok(false),
        }
    }
}

/// A name is stored directly under the root, so it may not contain separators or `..`.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

/// Random file name: `length` alphanumeric characters followed by `extension`.
pub fn generate_name(extension: &str, length: usize) -> String {
    let mut rng = rng();
    let mut name = String::with_capacity(length + extension.len());
    for _ in 0..length {
        name.push(ALPHABET[rng.random_range(0..ALPHABET.len())] as char);
    }
    name.push_str(extension);
    name
}

/// Extension (with leading dot) to store an upload under, based on its original file name.
pub fn image_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Create the media store from configuration, making sure the root directory exists.
pub async fn create_media_store(config: &MediaConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    tracing::info!("Creating local media store (root: {:?})", config.root);
    fs::create_dir_all(&config.root)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create media directory {:?}: {}", config.root, e))?;
    Ok(Arc::new(LocalMediaStore::new(config.root.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_name_shape() {
        for length in [1, 10, 32] {
            let name = generate_name(".png", length);
            assert!(name.ends_with(".png"));
            let stem = name.strip_suffix(".png").unwrap();
            assert_eq!(stem.len(), length);
            assert!(stem.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
        assert_eq!(generate_name(".jpg", 0), ".jpg");
    }

    #[test]
    fn test_generate_name_spread() {
        let names: HashSet<String> = (0..1000).map(|_| generate_name("", 10)).collect();
        assert_eq!(names.len(), 1000);

        let used: HashSet<u8> = names.iter().flat_map(|n| n.bytes()).collect();
        // 10,000 draws over 62 symbols hit every symbol with overwhelming probability
        assert_eq!(used.len(), ALPHABET.len());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension(Some("lamp.PNG")), ".png");
        assert_eq!(image_extension(Some("photo.jpeg")), ".jpeg");
        assert_eq!(image_extension(Some("archive.tar.gz")), ".jpg");
        assert_eq!(image_extension(Some("noext")), ".jpg");
        assert_eq!(image_extension(None), ".jpg");
    }

    #[tokio::test]
    async fn test_local_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().to_path_buf());

        store.store("abc.jpg", b"first").await.unwrap();
        assert!(store.exists("abc.jpg").await.unwrap());
        assert_eq!(store.retrieve("abc.jpg").await.unwrap(), b"first");

        // overwrite
        store.store("abc.jpg", b"second").await.unwrap();
        assert_eq!(store.retrieve("abc.jpg").await.unwrap(), b"second");

        store.delete("abc.jpg").await.unwrap();
        assert!(!store.exists("abc.jpg").await.unwrap());
        assert!(matches!(
            store.retrieve("abc.jpg").await,
            Err(MediaError::NotFound { .. })
        ));

        // deleting again is fine
        store.delete("abc.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_store_rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().join("media"));
        fs::create_dir_all(store.root()).await.unwrap();
        fs::write(dir.path().join("secret.txt"), b"nope").await.unwrap();

        for name in ["../secret.txt", "a/b.jpg", "a\\b.jpg", "..", ""] {
            assert!(
                matches!(store.retrieve(name).await, Err(MediaError::NotFound { .. })),
                "{name}"
            );
            assert!(
                matches!(store.store(name, b"x").await, Err(MediaError::InvalidName { .. })),
                "{name}"
            );
            assert!(!store.exists(name).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_create_media_store_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = MediaConfig {
            root: dir.path().join("nested").join("uploads"),
            ..MediaConfig::default()
        };

        let store = create_media_store(&config).await.unwrap();
        assert!(config.root.is_dir());
        store.store("x.png", b"img").await.unwrap();
        assert!(config.root.join("x.png").is_file());
    }
}
