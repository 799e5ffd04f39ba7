//! svgrast - rasterize SVG sources into PNG/WebP/JPEG artifacts.
//!
//! # Modules
//!
//! - [`dimension`]: target size resolution
//! - [`raster`]: decode → draw → encode pipeline
//! - [`blob`]: addressable binary resources and owning handles
//! - [`registry`]: artifacts kept alive by the process
//! - [`error_log`]: conversion and export failures
//! - [`export`]: hand-off of artifact bytes to a save target
//! - [`session`] / [`state`]: the pieces wired together, process-wide
//!
//! # Example
//!
//! ```ignore
//! let session = svgrast::state::session();
//! let source = SourceAsset::from_path(Path::new("logo.svg"))?;
//! let summary = session.convert_and_register(&source, OutputFormat::Png, None).await?;
//! session.export(&summary.id, &DirectoryTarget::new("out")).await;
//! session.remove(&summary.id);
//! ```

pub mod artifact;
pub mod blob;
pub mod config;
pub mod defaults;
pub mod dimension;
pub mod error_log;
pub mod export;
pub mod format;
pub mod logger;
pub mod raster;
pub mod registry;
pub mod session;
pub mod state;

pub use artifact::{ArtifactSummary, ConvertedArtifact, SourceAsset};
pub use dimension::{DimensionConfig, Size};
pub use error_log::ConversionError;
pub use format::OutputFormat;
pub use raster::ConvertError;
pub use session::Session;
