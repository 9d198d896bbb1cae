/// Photo handling module
///
/// This module handles:
/// - Compressing picked photos into embeddable JPEG data URLs
/// - Decoding embedded images for display
/// - Downloading and caching remote cat photos to disk

pub mod cache;
pub mod compress;

pub use cache::PhotoCache;
pub use compress::{base64_payload, compress};

use std::path::PathBuf;

/// Photo preparation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoError {
    #[error("Failed to read photo: {0}")]
    Io(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    #[error("Failed to download photo: {0}")]
    Download(String),

    #[error("Not an embedded image")]
    NotEmbedded,

    #[error("Task join error: {0}")]
    Task(String),
}

/// Size and quality bounds for prepared photos
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoSettings {
    pub max_dimension: u32,
    pub quality: f32,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            quality: 0.8,
        }
    }
}

/// Read a picked photo and compress it off the UI thread
pub async fn prepare_photo(path: PathBuf, settings: PhotoSettings) -> Result<String, PhotoError> {
    let raw = tokio::fs::read(&path)
        .await
        .map_err(|e| PhotoError::Io(format!("{}: {}", path.display(), e)))?;

    // Spawn blocking because decoding and resizing are CPU-intensive
    tokio::task::spawn_blocking(move || {
        compress(&raw, settings.max_dimension, settings.quality)
    })
    .await
    .map_err(|e| PhotoError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_missing_file() {
        let result = prepare_photo(
            PathBuf::from("/nonexistent/cat.jpg"),
            PhotoSettings::default(),
        )
        .await;
        assert!(matches!(result, Err(PhotoError::Io(_))));
    }

    #[tokio::test]
    async fn test_prepare_unreadable_photo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"\xff\xd8 truncated").unwrap();

        let result = prepare_photo(path, PhotoSettings::default()).await;
        assert!(matches!(result, Err(PhotoError::Decode(_))));
    }
}
