//! svgrast - command-line SVG rasterizer.

mod cli;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use std::path::Path;
use svgrast::config::{CONFIG_FILE, Config};
use svgrast::{logger, state};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    // An explicit --config must exist; the default file is optional
    let config = match &cli.config {
        Some(path) => Config::load(path, true),
        None => Config::load(Path::new(CONFIG_FILE), false),
    }
    .context("failed to load config")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(cli::run(&cli, &config, &mut std::io::stdout()));

    state::shutdown();

    if !result? {
        std::process::exit(1);
    }
    Ok(())
}
