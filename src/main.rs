mod classify;
mod config;
mod document;
mod error;
mod format;
mod io;
mod parser;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::error::InputError;
use crate::format::FieldGroup;
use crate::io::OutputTarget;

#[derive(Parser)]
#[command(name = "edgar_parser", about = "Structured JSON from SEC EDGAR contract filings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse contract markup into structured JSON
    Parse {
        /// Markup files (.htm/.html/.txt)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output file, or directory for one <stem>.json per input (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Render parsed JSON documents as flat prompt text
    Format {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Only the sections relevant to this field group
        #[arg(short, long, value_enum)]
        group: Option<FieldGroup>,
    },
    /// Print <path>\t<support contract>\t<auto renew> per markup file
    Classify {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load();
    debug!(?settings, "settings loaded");

    let (total, failed) = match cli.command {
        Commands::Parse {
            inputs,
            output,
            compact,
        } => (inputs.len(), parse_files(&inputs, output.as_deref(), compact, &settings)?),
        Commands::Format { inputs, group } => (inputs.len(), format_files(&inputs, group)),
        Commands::Classify { inputs } => (inputs.len(), classify_files(&inputs, &settings)?),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    if failed > 0 {
        bail!("{} of {} inputs failed", failed, total);
    }
    Ok(())
}

fn progress_bar(len: usize) -> anyhow::Result<ProgressBar> {
    if len < 2 {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .context("invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn report(path: &Path, err: InputError) {
    error!("{}: {:#}", path.display(), anyhow::Error::new(err));
}

/// Parse in parallel batches, write in input order. Returns the failure count.
fn parse_files(
    inputs: &[PathBuf],
    output: Option<&Path>,
    compact: bool,
    settings: &Settings,
) -> anyhow::Result<usize> {
    let target = OutputTarget::resolve(output, inputs.len());
    if matches!(target, OutputTarget::File(_)) && inputs.len() > 1 {
        warn!("{} inputs share one output file; only the last is kept", inputs.len());
    }

    let pb = progress_bar(inputs.len())?;
    let mut failed = 0;

    for chunk in inputs.chunks(settings.chunk_size) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| io::load_document(path, settings.max_nodes))
            .collect();

        for (path, result) in chunk.iter().zip(results) {
            let written = result.and_then(|doc| {
                if doc.is_empty() {
                    warn!(path = %path.display(), "no metadata or sections found");
                }
                info!(
                    path = %path.display(),
                    sections = doc.sections.len(),
                    doc_type = %doc.metadata.doc_type,
                    "parsed"
                );
                target.write(path, &doc, compact)
            });
            if let Err(e) = written {
                report(path, e);
                failed += 1;
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(failed)
}

fn format_files(inputs: &[PathBuf], group: Option<FieldGroup>) -> usize {
    let mut failed = 0;
    for path in inputs {
        match io::read_document_json(path) {
            Ok(doc) => {
                let text = match group {
                    Some(group) => {
                        let sections = format::relevant_sections(&doc, group);
                        debug!(?group, fields = ?group.fields(), sections = sections.len(), "relevant sections");
                        format::format_sections(sections, Some(&doc.metadata))
                    }
                    None => format::format_document(&doc),
                };
                println!("{}", text);
            }
            Err(e) => {
                report(path, e);
                failed += 1;
            }
        }
    }
    failed
}

fn classify_files(inputs: &[PathBuf], settings: &Settings) -> anyhow::Result<usize> {
    let pb = progress_bar(inputs.len())?;
    let mut failed = 0;

    for chunk in inputs.chunks(settings.chunk_size) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| -> Result<(u8, u8), InputError> {
                let raw = io::read_markup(path)?;
                let text = parser::document_text(&raw, settings.max_nodes);
                Ok((
                    classify::detect_support_contract(&text),
                    classify::detect_auto_renew(&text),
                ))
            })
            .collect();

        for (path, result) in chunk.iter().zip(results) {
            match result {
                Ok((support, auto_renew)) => {
                    pb.suspend(|| println!("{}\t{}\t{}", path.display(), support, auto_renew))
                }
                Err(e) => {
                    report(path, e);
                    failed += 1;
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(failed)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn cli_shape() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["edgar_parser", "format", "a.json", "--group", "governing-law"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Format { group: Some(FieldGroup::GoverningLaw), .. }
        ));
        assert!(Cli::try_parse_from(["edgar_parser", "parse"]).is_err());
    }

    #[test]
    fn progress_bar_for_batches() {
        assert!(progress_bar(1).unwrap().is_hidden());
        let pb = progress_bar(3).unwrap();
        assert_eq!(pb.length(), Some(3));
    }

    #[test]
    fn batch_continues_past_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![
            PathBuf::from("tests/fixtures/missing.htm"),
            PathBuf::from("tests/fixtures/table_layout.htm"),
            PathBuf::from("tests/fixtures/paragraph_layout.htm"),
        ];
        let settings = Settings {
            chunk_size: 2,
            ..Settings::default()
        };
        let failed = parse_files(&inputs, Some(dir.path()), false, &settings).unwrap();
        assert_eq!(failed, 1);
        assert!(dir.path().join("table_layout.json").is_file());
        assert!(dir.path().join("paragraph_layout.json").is_file());
    }
}
