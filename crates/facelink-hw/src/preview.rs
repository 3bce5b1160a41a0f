//! Preview object URLs for captured stills.
//!
//! A `PreviewStore` hands out `blob:` style URLs that resolve to image bytes
//! until revoked. Each URL is owned by an `ObjectUrl` guard which revokes it
//! when dropped, so a preview cannot outlive the widget that displays it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const URL_PREFIX: &str = "blob:facelink/";

struct Preview {
    bytes: Arc<[u8]>,
    mime: String,
}

/// Shared registry of live preview URLs.
#[derive(Clone, Default)]
pub struct PreviewStore {
    inner: Arc<Mutex<HashMap<String, Preview>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Preview>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `bytes` and return the guard owning its URL.
    pub fn create(&self, bytes: Vec<u8>, mime: &str) -> ObjectUrl {
        let url = format!("{URL_PREFIX}{}", uuid::Uuid::new_v4());
        self.entries().insert(
            url.clone(),
            Preview {
                bytes: bytes.into(),
                mime: mime.to_string(),
            },
        );
        tracing::debug!(url = %url, "preview URL created");
        ObjectUrl {
            url,
            store: self.clone(),
            revoked: false,
        }
    }

    /// Bytes and MIME type behind a live URL.
    pub fn resolve(&self, url: &str) -> Option<(Arc<[u8]>, String)> {
        self.entries()
            .get(url)
            .map(|p| (Arc::clone(&p.bytes), p.mime.clone()))
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.entries().contains_key(url)
    }

    /// Number of URLs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn revoke(&self, url: &str) {
        if self.entries().remove(url).is_some() {
            tracing::debug!(url = %url, "preview URL revoked");
        }
    }
}

/// Exclusive owner of one preview URL.
pub struct ObjectUrl {
    url: String,
    store: PreviewStore,
    revoked: bool,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn revoke(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.revoked {
            self.store.revoke(&self.url);
            self.revoked = true;
        }
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}
