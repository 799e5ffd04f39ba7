//! SVG rasterization pipeline.
//!
//! # Modules
//!
//! - [`backend`]: the [`Rasterizer`] capability trait
//! - [`headless`]: usvg/resvg implementation of it
//! - [`error`]: conversion failure taxonomy
//!
//! # Flow
//!
//! ```text
//! SourceAsset bytes
//!         │
//!         ▼
//!    ┌──────────┐
//!    │ allocate │ ──► temporary blob (released on every exit path)
//!    └────┬─────┘
//!         ▼
//!    ┌──────────┐
//!    │  decode  │ ──► raced against DECODE_TIMEOUT
//!    └────┬─────┘
//!         ▼
//!    ┌──────────┐
//!    │ resolve  │ ──► requested → defaults → intrinsic size
//!    └────┬─────┘
//!         ▼
//!    ┌──────────┐
//!    │   draw   │ ──► stretched onto a fresh surface
//!    └────┬─────┘
//!         ▼
//!    ┌──────────┐
//!    │  encode  │ ──► PNG / WebP / JPEG, new BinaryHandle
//!    └──────────┘
//! ```

mod backend;
mod error;
mod headless;

#[cfg(test)]
mod tests;

pub use backend::{Decoded, Rasterizer};
pub use error::ConvertError;
pub use headless::ResvgRasterizer;

use std::sync::Arc;
use std::time::Duration;

use crate::artifact::{ConvertedArtifact, SourceAsset, new_artifact_id};
use crate::blob::{BinaryHandle, BlobHost};
use crate::defaults::DefaultDimensions;
use crate::dimension::{DimensionConfig, intrinsic_or_fallback, resolve};
use crate::format::OutputFormat;

/// How long decoding may take before the conversion fails.
pub const DECODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Quality factor handed to lossy encoders.
pub const ENCODE_QUALITY: f32 = 0.95;

/// Converts vector sources into raster artifacts.
pub struct Pipeline<R> {
    host: Arc<dyn BlobHost>,
    rasterizer: R,
    defaults: Arc<DefaultDimensions>,
}

impl<R: Rasterizer> Pipeline<R> {
    pub fn new(host: Arc<dyn BlobHost>, rasterizer: R, defaults: Arc<DefaultDimensions>) -> Self {
        Self {
            host,
            rasterizer,
            defaults,
        }
    }

    pub fn host(&self) -> &Arc<dyn BlobHost> {
        &self.host
    }

    pub fn defaults(&self) -> &Arc<DefaultDimensions> {
        &self.defaults
    }

    /// Run one conversion attempt. Never retries and never registers the
    /// artifact; the caller decides what to do with either outcome.
    pub async fn convert(
        &self,
        source: &SourceAsset,
        format: OutputFormat,
        dimensions: Option<&DimensionConfig>,
    ) -> Result<ConvertedArtifact, ConvertError> {
        // dropped on every return below, which releases the blob
        let source_blob = BinaryHandle::allocate(&self.host, source.data.as_slice());
        crate::debug!("convert"; "{}: staged as {}", source.name, source_blob.url());

        let data = source_blob
            .bytes()
            .ok_or_else(|| ConvertError::DecodeFailed("source resource unavailable".into()))?;

        let decoded = match tokio::time::timeout(DECODE_TIMEOUT, self.rasterizer.decode(data)).await
        {
            Ok(Ok(decoded)) => decoded,
            Ok(Err(message)) => return Err(ConvertError::DecodeFailed(message)),
            Err(_) => {
                crate::debug!("convert"; "{}: decode timed out", source.name);
                return Err(ConvertError::DecodeTimeout(DECODE_TIMEOUT));
            }
        };

        let (original_width, original_height) = intrinsic_or_fallback(decoded.width, decoded.height);

        let requested = dimensions.copied().unwrap_or_default();
        let size = resolve(
            original_width,
            original_height,
            &requested,
            &self.defaults.get(),
        );
        crate::debug!(
            "convert";
            "{}: {}x{} -> {}x{} {}",
            source.name, original_width, original_height, size.width, size.height, format
        );

        let mut surface = self
            .rasterizer
            .surface(size.width, size.height)
            .ok_or(ConvertError::SurfaceUnavailable {
                width: size.width,
                height: size.height,
            })?;

        self.rasterizer
            .draw(&decoded.image, &mut surface)
            .map_err(|e| ConvertError::EncodeFailed(format!("failed to process SVG: {e}")))?;

        let encoded = self
            .rasterizer
            .encode(surface, format, ENCODE_QUALITY)
            .await
            .map_err(ConvertError::EncodeFailed)?;
        if encoded.is_empty() {
            return Err(ConvertError::EncodeFailed("encoder produced no output".into()));
        }

        let size_bytes = encoded.len();
        let handle = BinaryHandle::allocate(&self.host, encoded);

        Ok(ConvertedArtifact {
            id: new_artifact_id(),
            original_name: format.output_name(&source.name),
            format,
            handle,
            size: size_bytes,
            width: size.width,
            height: size.height,
            original_width,
            original_height,
        })
    }
}
