//! Conversion failures keyed by source file name.

use serde::{Deserialize, Serialize};

/// A single logged failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionError {
    pub file_name: String,
    pub message: String,
}

impl ConversionError {
    pub fn new(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            message: message.into(),
        }
    }
}

/// Append-only (clearable) failure list. No dedup, no bound.
#[derive(Debug, Default, Clone)]
pub struct ErrorLog {
    entries: Vec<ConversionError>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: ConversionError) {
        self.entries.push(error);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ConversionError] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
