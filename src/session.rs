//! Conversion session: registry, error log and defaults around a pipeline.
//!
//! All mutations go through the methods below. Locks are never held across
//! an `.await`, so each mutation completes before the next one starts.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::artifact::{ArtifactSummary, ConvertedArtifact, SourceAsset};
use crate::blob::{BlobHost, BlobStore};
use crate::defaults::DefaultDimensions;
use crate::dimension::DimensionConfig;
use crate::error_log::{ConversionError, ErrorLog};
use crate::export::{DOWNLOAD_FAILED, SaveTarget, hand_off};
use crate::format::OutputFormat;
use crate::raster::{ConvertError, Pipeline, Rasterizer};
use crate::registry::{ArtifactRegistry, RegistryError};

pub struct Session<R> {
    pipeline: Pipeline<R>,
    registry: Mutex<ArtifactRegistry>,
    errors: Mutex<ErrorLog>,
    in_flight: AtomicUsize,
}

impl<R: Rasterizer> Session<R> {
    /// Session backed by a fresh in-memory [`BlobStore`].
    pub fn new(rasterizer: R) -> Self {
        Self::with_host(Arc::new(BlobStore::new()), rasterizer)
    }

    pub fn with_host(host: Arc<dyn BlobHost>, rasterizer: R) -> Self {
        let defaults = Arc::new(DefaultDimensions::default());
        Self {
            pipeline: Pipeline::new(host, rasterizer, defaults),
            registry: Mutex::new(ArtifactRegistry::new()),
            errors: Mutex::new(ErrorLog::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Convert without registering the result.
    pub async fn convert(
        &self,
        source: &SourceAsset,
        format: OutputFormat,
        dimensions: Option<&DimensionConfig>,
    ) -> Result<ConvertedArtifact, ConvertError> {
        let _guard = InFlight::enter(&self.in_flight);
        self.pipeline.convert(source, format, dimensions).await
    }

    /// Convert and register on success, or log the failure under the
    /// source name. Returns the summary of the registered artifact; an
    /// artifact the registry rejects is a failure like any other.
    pub async fn convert_and_register(
        &self,
        source: &SourceAsset,
        format: OutputFormat,
        dimensions: Option<&DimensionConfig>,
    ) -> Result<ArtifactSummary, ConvertError> {
        match self.convert(source, format, dimensions).await {
            Ok(artifact) => self.register(&source.name, artifact),
            Err(e) => {
                self.record_error(ConversionError::new(&source.name, e.to_string()));
                Err(e)
            }
        }
    }

    fn register(
        &self,
        source_name: &str,
        artifact: ConvertedArtifact,
    ) -> Result<ArtifactSummary, ConvertError> {
        let summary = artifact.summary();
        // a rejected artifact is dropped by `add`, releasing its handle
        self.add(artifact).map_err(|e| {
            let e = ConvertError::from(e);
            self.record_error(ConversionError::new(source_name, e.to_string()));
            e
        })?;
        Ok(summary)
    }

    /// Whether any conversion is currently running.
    pub fn is_converting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // =========================================================================
    // Registry
    // =========================================================================

    pub fn add(&self, artifact: ConvertedArtifact) -> Result<(), RegistryError> {
        self.registry.lock().add(artifact)
    }

    /// Remove and release an artifact. Unknown ids are ignored.
    pub fn remove(&self, id: &str) -> bool {
        self.registry.lock().remove(id)
    }

    pub fn list(&self) -> Vec<ArtifactSummary> {
        self.registry.lock().summaries()
    }

    pub fn get(&self, id: &str) -> Option<ArtifactSummary> {
        self.registry.lock().get(id).map(ConvertedArtifact::summary)
    }

    /// Release every registered artifact.
    pub fn clear(&self) {
        self.registry.lock().clear();
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Save an artifact through `target` under its output name.
    ///
    /// Unknown ids do nothing. Failures are recorded in the error log and
    /// never returned.
    pub async fn export(&self, id: &str, target: &dyn SaveTarget) {
        let Some((url, name)) = self
            .registry
            .lock()
            .get(id)
            .map(|a| (a.handle.url().clone(), a.original_name.clone()))
        else {
            return;
        };

        if let Err(e) = hand_off(self.pipeline.host(), &url, &name, target).await {
            crate::debug!("export"; "{}: {}", name, e);
            self.record_error(ConversionError::new(name, DOWNLOAD_FAILED));
        }
    }

    // =========================================================================
    // Error log
    // =========================================================================

    pub fn record_error(&self, error: ConversionError) {
        self.errors.lock().record(error);
    }

    pub fn clear_errors(&self) {
        self.errors.lock().clear();
    }

    pub fn errors(&self) -> Vec<ConversionError> {
        self.errors.lock().entries().to_vec()
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    pub fn defaults(&self) -> DimensionConfig {
        self.pipeline.defaults().get()
    }

    /// Merge supplied fields into the default dimensions.
    pub fn update_defaults(&self, partial: &DimensionConfig) -> DimensionConfig {
        self.pipeline.defaults().update(partial)
    }
}

/// Counts a running conversion for as long as it is alive.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
