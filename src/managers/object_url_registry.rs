//! Display URLs for in-memory image data.
//!
//! An `ObjectUrl` is a revocable handle that resolves to a `Blob` while it is
//! registered. Handles release themselves on drop, so replacing one in state
//! frees the data it pinned.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::types::file::Blob;

const URL_PREFIX: &str = "blob:imgconv/";

/// Registry of live display URLs.
#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    entries: Arc<Mutex<HashMap<String, Blob>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Blob>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `blob` and returns an owning handle to it.
    pub fn create_object_url(&self, blob: Blob) -> ObjectUrl {
        let url = format!("{}{}", URL_PREFIX, Uuid::new_v4());
        self.entries().insert(url.clone(), blob.clone());
        log::debug!("Created display URL {} ({} bytes)", url, blob.size());
        ObjectUrl {
            url,
            blob,
            registry: self.clone(),
            released: false,
        }
    }

    /// Looks up the data behind a URL, if it has not been revoked.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.entries().get(url).cloned()
    }

    /// Revokes a URL. Returns false when it was unknown or already revoked.
    pub fn revoke_object_url(&self, url: &str) -> bool {
        let removed = self.entries().remove(url).is_some();
        if removed {
            log::debug!("Revoked display URL {}", url);
        }
        removed
    }

    /// Number of URLs currently registered.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }
}

impl fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Owning handle to a registered display URL.
pub struct ObjectUrl {
    url: String,
    blob: Blob,
    registry: ObjectUrlRegistry,
    released: bool,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    /// Releases the URL now instead of at drop.
    pub fn revoke(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.registry.revoke_object_url(&self.url);
            self.released = true;
        }
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrl")
            .field("url", &self.url)
            .field("blob", &self.blob)
            .finish()
    }
}

impl PartialEq for ObjectUrl {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}
