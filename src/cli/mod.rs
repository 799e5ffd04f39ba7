//! CLI entry points.

pub mod args;

pub use args::Cli;

use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use svgrast::artifact::{ArtifactSummary, SourceAsset};
use svgrast::config::Config;
use svgrast::error_log::ConversionError;
use svgrast::export::DirectoryTarget;
use svgrast::{debug, log, state};

/// JSON report printed with `--json`.
#[derive(Debug, Serialize)]
struct Report {
    artifacts: Vec<ArtifactSummary>,
    errors: Vec<ConversionError>,
}

/// Convert every input file in turn, export it, then dispose of it.
///
/// The `--json` report is the only thing written to `out`. Returns
/// `Ok(false)` when any error was logged.
pub async fn run(cli: &Cli, config: &Config, out: &mut impl Write) -> Result<bool> {
    let session = state::session();
    session.update_defaults(&config.defaults);

    let format = cli.format.unwrap_or(config.output.format);
    let dimensions = cli.dimensions();
    let target = DirectoryTarget::new(cli.output.clone().unwrap_or_else(|| config.output.dir.clone()));
    debug!("convert"; "format={} dimensions={:?} dir={}", format, dimensions, target.dir().display());

    let mut artifacts = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let source = match SourceAsset::from_path(path) {
            Ok(source) => source,
            Err(e) => {
                session.record_error(ConversionError::new(
                    path.display().to_string(),
                    format!("failed to read file: {e}"),
                ));
                continue;
            }
        };

        let Ok(summary) = session
            .convert_and_register(&source, format, dimensions.as_ref())
            .await
        else {
            continue;
        };

        session.export(&summary.id, &target).await;
        session.remove(&summary.id);

        if !cli.json {
            log!(
                "convert";
                "{} -> {} ({}x{}, {} bytes)",
                source.name, summary.original_name, summary.width, summary.height, summary.size
            );
        }
        artifacts.push(summary);
    }

    let errors = session.errors();
    if cli.json {
        let report = Report {
            artifacts,
            errors: errors.clone(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        for error in &errors {
            log!("error"; "{}: {}", error.file_name, error.message);
        }
    }

    Ok(errors.is_empty())
}
