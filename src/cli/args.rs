//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;
use svgrast::dimension::DimensionConfig;
use svgrast::format::OutputFormat;

/// Rasterize SVG files into PNG, WebP or JPEG
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// SVG files to convert
    #[arg(required = true, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Output format (default: from config, else png)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Target width in pixels
    #[arg(short = 'W', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Target height in pixels
    #[arg(short = 'H', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Derive the missing dimension from the source aspect ratio
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub keep_aspect: Option<bool>,

    /// Output directory (default: from config, else current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: svgrast.toml, optional)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print artifacts and errors as JSON
    #[arg(long)]
    pub json: bool,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

impl Cli {
    /// Per-call dimension request, `None` when no size flag was given.
    pub fn dimensions(&self) -> Option<DimensionConfig> {
        if self.width.is_none() && self.height.is_none() && self.keep_aspect.is_none() {
            return None;
        }
        Some(DimensionConfig {
            width: self.width,
            height: self.height,
            maintain_aspect_ratio: self.keep_aspect,
        })
    }
}
