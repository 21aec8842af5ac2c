mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use raidlens_core::selection;
use raidlens_core::source::{EventDump, MemorySource, RecordFilter};
use raidlens_core::{AggregationContext, SpellBook, ViewerConfig};
use tracing_subscriber::filter::EnvFilter;

use render::{RenderOptions, render_snapshot};

#[derive(Parser)]
#[command(version, about = "Ability detail breakdowns for recorded raid instances")]
struct Cli {
    /// Explicit config file instead of the stored one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an event dump and print the selected breakdowns
    Show {
        /// JSON event dump
        events: PathBuf,
        /// Selection codes to print (defaults come from the config)
        #[arg(short, long = "selection")]
        selections: Vec<u32>,
        /// Spell name file (TOML)
        #[arg(long)]
        spells: Option<PathBuf>,
        /// Restrict to these subject ids
        #[arg(long = "subject")]
        subjects: Vec<u64>,
        /// Print only the top N abilities
        #[arg(long)]
        top: Option<usize>,
        /// Print the per-subject breakdown too
        #[arg(long)]
        per_subject: bool,
        /// European number format
        #[arg(long)]
        european: bool,
    },
    /// List the known selection codes
    Codes,
}

/// Initialize logging, writing to RAIDLENS_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("RAIDLENS_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => ViewerConfig::load().context("loading stored config"),
    }
}

/// Spells are optional: a missing default file just means placeholder labels.
fn load_spells(explicit: Option<PathBuf>, config: &ViewerConfig) -> anyhow::Result<SpellBook> {
    if let Some(path) = explicit {
        return SpellBook::from_file(&path)
            .with_context(|| format!("loading spells {}", path.display()));
    }
    match config.spells_path() {
        Some(path) if path.exists() => SpellBook::from_file(&path)
            .with_context(|| format!("loading spells {}", path.display())),
        _ => {
            tracing::debug!("No spell file, labels will be placeholders");
            Ok(SpellBook::empty())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Codes => {
            for code in selection::known_codes() {
                if let Some(selection) = selection::resolve(code) {
                    println!("{code:>3}  {}", selection.describe());
                }
            }
            Ok(())
        }
        Commands::Show {
            events,
            selections,
            spells,
            subjects,
            top,
            per_subject,
            european,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let dump = EventDump::from_path(&events)?;
            tracing::info!(records = dump.records.len(), path = %events.display(), "Loaded event dump");

            let spells = load_spells(spells, &config)?;
            spells.set_meta(dump.meta);

            let source = Arc::new(MemorySource::from_dump(dump));
            if !subjects.is_empty() {
                source
                    .set_filter(RecordFilter {
                        subjects: Some(subjects),
                        time_range: None,
                    })
                    .await;
            }

            let context = AggregationContext::with_fetch_timeout(
                source,
                Arc::new(spells),
                config.fetch_timeout(),
            );
            let mut selector = context.selector();
            let options = RenderOptions {
                european: european || config.european_numbers,
                top,
                subjects: per_subject,
            };
            let wait = config
                .fetch_timeout()
                .unwrap_or(Duration::from_secs(30))
                .saturating_mul(2);

            let codes = if selections.is_empty() {
                config.default_selections.clone()
            } else {
                selections
            };
            for code in codes {
                selector.select(code);
                // Unknown codes leave the previous selection in place.
                if selector.current_code() != Some(code) {
                    continue;
                }
                let Some(current) = selector.current_selection() else {
                    continue;
                };
                match selector.settled(wait).await {
                    Some(snapshot) => {
                        print!("{}", render_snapshot(code, &current, &snapshot, &options));
                    }
                    None => tracing::warn!(code, "No snapshot available"),
                }
            }

            selector.dispose();
            context.dispose();
            Ok(())
        }
    }
}
