use iced::widget::image::Handle;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::compress::{decode_data_url, is_data_url};
use super::PhotoError;

/// Get the photo cache directory
/// Returns ~/.cache/xmu-cats/photos on Linux, or None if no cache dir exists
pub fn get_photo_cache_dir() -> Option<PathBuf> {
    let mut path = dirs_next::cache_dir().or_else(dirs_next::home_dir)?;

    path.push("xmu-cats");
    path.push("photos");

    if let Err(e) = fs::create_dir_all(&path) {
        tracing::warn!(error = %e, "Photo cache disabled");
        return None;
    }

    Some(path)
}

/// On-disk location for a downloaded URL
pub fn cache_path(cache_dir: &Path, url: &str) -> PathBuf {
    let digest = Sha256::digest(url.as_bytes());
    cache_dir.join(format!("{:x}.img", digest))
}

const USER_AGENT: &str = concat!("xmu-cats/", env!("CARGO_PKG_VERSION"));

/// Downloads remote photos through one shared HTTP client
///
/// Cloning is cheap; every clone reuses the same connection pool.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    cache_dir: Option<PathBuf>,
}

impl RemoteFetcher {
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, PhotoError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PhotoError::Download(e.to_string()))?;

        Ok(Self { client, cache_dir })
    }

    /// Fetch a remote photo, serving it from the disk cache when possible
    pub async fn fetch(self, url: String) -> Result<Vec<u8>, PhotoError> {
        fetch_remote(&self.client, &url, self.cache_dir.as_deref()).await
    }
}

async fn fetch_remote(
    client: &reqwest::Client,
    url: &str,
    cache_dir: Option<&Path>,
) -> Result<Vec<u8>, PhotoError> {
    let cached = cache_dir.map(|dir| cache_path(dir, url));

    if let Some(path) = &cached {
        if let Ok(bytes) = tokio::fs::read(path).await {
            return Ok(bytes);
        }
    }

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| PhotoError::Download(e.to_string()))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PhotoError::Download(e.to_string()))?
        .to_vec();

    tracing::debug!(url = %url, bytes = bytes.len(), "Downloaded photo");

    if let Some(path) = &cached {
        if let Err(e) = tokio::fs::write(path, &bytes).await {
            tracing::warn!(error = %e, path = %path.display(), "Failed to cache photo");
        }
    }

    Ok(bytes)
}

/// Decoded image handles keyed by the profile's `imageUrl`
#[derive(Default)]
pub struct PhotoCache {
    handles: HashMap<String, Handle>,
    pending: HashSet<String>,
    failed: HashSet<String>,
    fetcher: Option<RemoteFetcher>,
}

impl PhotoCache {
    /// Without a usable HTTP client remote photos stay as placeholders
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        let fetcher = match RemoteFetcher::new(cache_dir) {
            Ok(fetcher) => Some(fetcher),
            Err(e) => {
                tracing::warn!(error = %e, "Remote photos disabled");
                None
            }
        };

        Self {
            fetcher,
            ..Default::default()
        }
    }

    pub fn fetcher(&self) -> Option<RemoteFetcher> {
        self.fetcher.clone()
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.handles.get(url)
    }

    /// Make `url` available for display.
    ///
    /// Embedded images are decoded right away. Returns `true` when the
    /// caller must start a download (remote URL seen for the first time).
    pub fn request(&mut self, url: &str) -> bool {
        if url.is_empty()
            || self.handles.contains_key(url)
            || self.pending.contains(url)
            || self.failed.contains(url)
        {
            return false;
        }

        if is_data_url(url) {
            match decode_data_url(url) {
                Ok(bytes) => self.insert(url.to_string(), bytes),
                Err(e) => {
                    tracing::warn!(error = %e, "Unreadable embedded photo");
                    self.failed.insert(url.to_string());
                }
            }
            return false;
        }

        self.pending.insert(url.to_string());
        true
    }

    pub fn insert(&mut self, url: String, bytes: Vec<u8>) {
        self.pending.remove(&url);
        self.handles.insert(url, Handle::from_bytes(bytes));
    }

    /// Stop retrying a URL that could not be loaded
    pub fn mark_failed(&mut self, url: String) {
        self.pending.remove(&url);
        self.failed.insert(url);
    }

    /// Drop decoded and failed entries for URLs no longer referenced.
    /// In-flight downloads are left alone.
    pub fn retain_only<'a>(&mut self, live: impl IntoIterator<Item = &'a str>) {
        let live: HashSet<&str> = live.into_iter().collect();
        let before = self.handles.len();

        self.handles.retain(|url, _| live.contains(url.as_str()));
        self.failed.retain(|url| live.contains(url.as_str()));

        let evicted = before - self.handles.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted unused photos");
        }
    }
}

impl std::fmt::Debug for PhotoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoCache")
            .field("loaded", &self.handles.len())
            .field("pending", &self.pending.len())
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}
