//! Ordered registry of converted artifacts.
//!
//! The registry owns every artifact added to it. Removing an artifact drops
//! it, which releases its binary handle.

use thiserror::Error;

use crate::artifact::{ArtifactSummary, ConvertedArtifact};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("artifact `{0}` is already registered")]
    Duplicate(String),
}

#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    artifacts: Vec<ConvertedArtifact>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact. A duplicate id is rejected and the rejected
    /// artifact is dropped.
    pub fn add(&mut self, artifact: ConvertedArtifact) -> Result<(), RegistryError> {
        if self.contains(&artifact.id) {
            return Err(RegistryError::Duplicate(artifact.id.clone()));
        }
        self.artifacts.push(artifact);
        Ok(())
    }

    /// Remove and dispose of the artifact with `id`. Returns whether
    /// anything was removed; an unknown id is not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.artifacts.iter().position(|a| a.id == id) else {
            return false;
        };
        let artifact = self.artifacts.remove(index);
        crate::debug!("registry"; "removed {} ({})", artifact.original_name, artifact.id);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ConvertedArtifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Artifacts in insertion order.
    pub fn list(&self) -> &[ConvertedArtifact] {
        &self.artifacts
    }

    pub fn summaries(&self) -> Vec<ArtifactSummary> {
        self.artifacts.iter().map(ConvertedArtifact::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Dispose of every artifact.
    pub fn clear(&mut self) {
        self.artifacts.clear();
    }
}
