//! Raster output formats.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raster output format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG format.
    #[default]
    Png,
    /// WebP format.
    Webp,
    /// JPEG format.
    Jpg,
}

impl OutputFormat {
    /// Get file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Jpg => "jpg",
        }
    }

    /// MIME type of the encoded output.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Jpg => "image/jpeg",
        }
    }

    /// Whether the encoder honors a quality factor.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpg | Self::Webp)
    }

    /// Output name for a vector source: a trailing `.svg` is swapped for
    /// this format's extension, anything else gets the extension appended.
    pub fn output_name(self, source_name: &str) -> String {
        let stem = strip_suffix_ignore_case(source_name, ".svg").unwrap_or(source_name);
        format!("{stem}.{}", self.extension())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
