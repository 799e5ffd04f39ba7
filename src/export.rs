//! Hand-off of artifact bytes to an external "save as file" primitive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::blob::{BinaryHandle, BlobHost, BlobUrl};

/// Message logged for every failed export.
pub const DOWNLOAD_FAILED: &str = "Failed to download image";

/// Accepts bytes together with a suggested file name.
pub trait SaveTarget: Send + Sync {
    fn save(&self, bytes: &[u8], suggested_name: &str) -> io::Result<()>;
}

/// Writes exported files into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&self, bytes: &[u8], suggested_name: &str) -> io::Result<()> {
        // keep only the final component so names cannot escape the directory
        let file_name = Path::new(suggested_name)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty file name"))?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        crate::debug!("export"; "wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no content behind `{0}`")]
    MissingContent(BlobUrl),

    #[error("fetch task failed: {0}")]
    Fetch(String),

    #[error("save target rejected `{name}`")]
    Save {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Fetch the content behind `url` and pass it to `target` under `name`.
///
/// The content is staged in a transient blob for the duration of the
/// hand-off, released before returning.
pub(crate) async fn hand_off(
    host: &Arc<dyn BlobHost>,
    url: &BlobUrl,
    name: &str,
    target: &dyn SaveTarget,
) -> Result<(), ExportError> {
    let bytes = fetch(host, url).await?;

    let transient = BinaryHandle::allocate(host, bytes);
    let staged = transient
        .bytes()
        .ok_or_else(|| ExportError::MissingContent(transient.url().clone()))?;

    target
        .save(&staged, name)
        .map_err(|source| ExportError::Save {
            name: name.to_string(),
            source,
        })
}

/// Read the bytes behind `url` off the async scheduler.
async fn fetch(host: &Arc<dyn BlobHost>, url: &BlobUrl) -> Result<Arc<[u8]>, ExportError> {
    let (host, owned) = (Arc::clone(host), url.clone());
    tokio::task::spawn_blocking(move || host.fetch(&owned))
        .await
        .map_err(|e| ExportError::Fetch(e.to_string()))?
        .ok_or_else(|| ExportError::MissingContent(url.clone()))
}
