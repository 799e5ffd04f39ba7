//! Configuration management for `svgrast.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                         |
//! |--------------|-------------------------------------------------|
//! | `[defaults]` | Process-wide default dimensions                 |
//! | `[output]`   | Output directory and format for the CLI         |
//!
//! # Example
//!
//! ```toml
//! [defaults]
//! width = 800
//! maintain_aspect_ratio = true
//!
//! [output]
//! dir = "out"
//! format = "webp"
//! ```

mod error;

pub use error::ConfigError;

use crate::dimension::DimensionConfig;
use crate::format::OutputFormat;
use crate::log;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "svgrast.toml";

/// Root configuration structure representing svgrast.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default dimensions merged into the session at startup
    pub defaults: DimensionConfig,

    /// Where and how the CLI writes results
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DimensionConfig::initial_defaults(),
            output: OutputConfig::default(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory exported files are written to.
    pub dir: PathBuf,

    /// Raster format used when the CLI does not specify one.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            format: OutputFormat::Png,
        }
    }
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the default configuration unless `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !path.exists() && !required {
            crate::debug!("config"; "{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let (config, _) = Self::parse_with_ignored(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Reject explicit zero sizes.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("defaults.width", self.defaults.width),
            ("defaults.height", self.defaults.height),
        ] {
            if value == Some(0) {
                return Err(ConfigError::Validation(format!("{field} must be positive")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// tests
// ============================================================================
