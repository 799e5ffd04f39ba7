//! Conversion error types.

use std::time::Duration;
use thiserror::Error;

use crate::registry::RegistryError;

/// Terminal failure of a single conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("failed to load SVG: {0}")]
    DecodeFailed(String),

    #[error("SVG loading timed out after {}s", .0.as_secs())]
    DecodeTimeout(Duration),

    #[error("canvas context not available for {width}x{height} surface")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("conversion failed: {0}")]
    EncodeFailed(String),

    #[error(transparent)]
    Rejected(#[from] RegistryError),
}

impl ConvertError {
    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DecodeFailed(_) => "decode_failed",
            Self::DecodeTimeout(_) => "decode_timeout",
            Self::SurfaceUnavailable { .. } => "surface_unavailable",
            Self::EncodeFailed(_) => "encode_failed",
            Self::Rejected(_) => "rejected",
        }
    }
}
