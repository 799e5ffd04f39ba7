//! Conversion inputs and outputs.

use serde::Serialize;
use std::path::Path;

use crate::blob::BinaryHandle;
use crate::format::OutputFormat;

/// Raw vector file handed to a single conversion.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub name: String,
    pub data: Vec<u8>,
}

impl SourceAsset {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, named after its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self { name, data })
    }
}

/// Result of one successful conversion.
///
/// Owns the handle to the encoded bytes; dropping the artifact releases it.
#[derive(Debug)]
pub struct ConvertedArtifact {
    pub id: String,
    pub original_name: String,
    pub format: OutputFormat,
    pub handle: BinaryHandle,
    pub size: usize,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl ConvertedArtifact {
    /// Metadata snapshot without ownership of the bytes.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            id: self.id.clone(),
            original_name: self.original_name.clone(),
            format: self.format,
            url: self.handle.url().to_string(),
            size: self.size,
            width: self.width,
            height: self.height,
            original_width: self.original_width,
            original_height: self.original_height,
        }
    }
}

/// Cloneable view of a [`ConvertedArtifact`] for listing and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSummary {
    pub id: String,
    pub original_name: String,
    pub format: OutputFormat,
    pub url: String,
    pub size: usize,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

/// Fresh random artifact id.
pub fn new_artifact_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
