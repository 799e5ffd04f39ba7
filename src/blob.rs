//! Addressable in-memory binary resources.
//!
//! A [`BlobHost`] hands out URLs for byte buffers, the same way a browser
//! hands out object URLs. A [`BinaryHandle`] owns one such URL and releases
//! it exactly once when dropped, so a resource lives precisely as long as
//! the value that addresses it.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// URL scheme prefix for blobs served by [`BlobStore`].
const BLOB_SCHEME: &str = "blob:svgrast/";

/// Address of a hosted blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host of addressable byte buffers.
pub trait BlobHost: Send + Sync + 'static {
    /// Make `data` addressable under a fresh URL.
    fn allocate(&self, data: Arc<[u8]>) -> BlobUrl;

    /// Bytes behind `url`, or `None` once released.
    fn fetch(&self, url: &BlobUrl) -> Option<Arc<[u8]>>;

    /// Drop the buffer behind `url`. Releasing an unknown URL is a no-op.
    fn release(&self, url: &BlobUrl);
}

// ============================================================================
// BlobStore
// ============================================================================

/// Allocation counters of a [`BlobStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobStats {
    pub allocated: usize,
    pub released: usize,
}

impl BlobStats {
    /// Buffers currently alive.
    pub fn live(&self) -> usize {
        self.allocated - self.released
    }
}

/// Concurrent in-memory [`BlobHost`].
#[derive(Default)]
pub struct BlobStore {
    entries: DashMap<BlobUrl, Arc<[u8]>>,
    next_id: AtomicU64,
    allocated: AtomicUsize,
    released: AtomicUsize,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> BlobStats {
        BlobStats {
            allocated: self.allocated.load(Ordering::SeqCst),
            released: self.released.load(Ordering::SeqCst),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BlobHost for BlobStore {
    fn allocate(&self, data: Arc<[u8]>) -> BlobUrl {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = BlobUrl(format!("{BLOB_SCHEME}{id}"));
        self.entries.insert(url.clone(), data);
        self.allocated.fetch_add(1, Ordering::SeqCst);
        url
    }

    fn fetch(&self, url: &BlobUrl) -> Option<Arc<[u8]>> {
        self.entries.get(url).map(|entry| Arc::clone(entry.value()))
    }

    fn release(&self, url: &BlobUrl) {
        if self.entries.remove(url).is_some() {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ============================================================================
// BinaryHandle
// ============================================================================

/// Owning reference to a hosted blob. Not cloneable: the resource is
/// released when the handle is dropped.
pub struct BinaryHandle {
    url: BlobUrl,
    len: usize,
    host: Arc<dyn BlobHost>,
}

impl BinaryHandle {
    /// Host `data` and take ownership of the resulting URL.
    pub fn allocate(host: &Arc<dyn BlobHost>, data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        let len = data.len();
        let url = host.allocate(data);
        Self {
            url,
            len,
            host: Arc::clone(host),
        }
    }

    pub fn url(&self) -> &BlobUrl {
        &self.url
    }

    /// Byte length of the hosted content.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Content behind the handle.
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.host.fetch(&self.url)
    }
}

impl Drop for BinaryHandle {
    fn drop(&mut self) {
        self.host.release(&self.url);
        crate::debug!("blob"; "released {}", self.url);
    }
}

impl fmt::Debug for BinaryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryHandle")
            .field("url", &self.url)
            .field("len", &self.len)
            .finish()
    }
}
