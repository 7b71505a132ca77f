//! Template Locker - command line entry point
//!
//! Locks office document templates so only their blank cells stay
//! editable, or reports how many cells are blank.

mod commands;
mod config;
mod error;
mod scratch;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::{ConfigManager, DEFAULT_CONFIG_FILE};
use error::{AppError, ErrorPayload};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "template-locker", version, about)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Root directory for per-request scratch storage
    #[arg(long, global = true)]
    scratch_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lock a document: blank cells stay editable, everything else is protected
    Lock {
        /// Document to lock (.docx, .xlsx or .xls)
        input: PathBuf,
        /// Where to write the locked document; defaults to the prefixed name
        /// next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Count blank and filled cells without changing anything
    Inspect {
        /// Document to inspect
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_err) => {
                    let payload = ErrorPayload::from(app_err);
                    match serde_json::to_string(&payload) {
                        Ok(json) => eprintln!("{}", json),
                        Err(_) => eprintln!("error: {}", app_err),
                    }
                }
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut manager = ConfigManager::new(&cli.config);
    manager.load_sync()?;
    tracing::debug!("Configuration from {}", manager.config_path().display());
    let mut config = manager.get().clone();
    if let Some(dir) = cli.scratch_dir {
        config.scratch_dir = dir;
    }

    match cli.command {
        Command::Lock { input, output } => {
            let (filename, bytes) = read_input(&input)?;
            let attachment = commands::lock_document(&config, &filename, &bytes)?;
            let output = output.unwrap_or_else(|| input.with_file_name(&attachment.filename));
            std::fs::write(&output, &attachment.bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "Locked {} -> {} ({} empty, {} filled)",
                input.display(),
                output.display(),
                attachment.counts.empty_count,
                attachment.counts.filled_count
            );
        }
        Command::Inspect { input } => {
            let (filename, bytes) = read_input(&input)?;
            let inspection = commands::inspect_document(&config, &filename, &bytes)?;
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    tracing::info!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok((filename, bytes))
}
