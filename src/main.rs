//! DiskCensus: physical disk and volume inventory.
//!
//! Thin binary entry point. All inventory logic lives in `diskcensus-core`.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use diskcensus_core::export::{self, InventoryReport};
use diskcensus_core::runner::ProcessRunner;
use diskcensus_core::{platform, DiskInventory, InventoryConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

#[derive(Parser)]
#[command(name = "diskcensus", version)]
#[command(about = "Inventory physical disks and volumes from diskpart output")]
struct Cli {
    /// JSON run configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Partitioning tool to drive
    #[arg(long)]
    tool: Option<PathBuf>,

    /// Seconds to wait for each tool invocation
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only report these disk numbers (repeatable)
    #[arg(short, long = "disk")]
    disks: Vec<u32>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn inventory_config(&self) -> Result<InventoryConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open config {}", path.display()))?;
                serde_json::from_reader(file)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => InventoryConfig::default(),
        };
        if let Some(tool) = &self.tool {
            config.tool = tool.clone();
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    let config = cli.inventory_config()?;
    tracing::debug!(?config, "configuration loaded");

    if !platform::is_elevated() {
        tracing::warn!("not running elevated; the tool may refuse to detail disks");
    }

    let source = platform::default_source();
    let runner = ProcessRunner::new(&config);
    let disks = DiskInventory::new(runner, source.as_ref(), config)
        .collect()
        .context("disk inventory failed")?;

    let mut report = InventoryReport::new(disks);
    report.retain_disks(&cli.disks);

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);
    match cli.format {
        Format::Table => export::write_table(&report, &mut out),
        Format::Csv => export::write_csv(&report, &mut out),
        Format::Json => export::write_json(&report, &mut out),
    }
    .context("failed to write report")?;
    out.flush().context("failed to write report")?;

    if let Some(path) = &cli.output {
        tracing::info!(path = %path.display(), disks = report.disks.len(), "report written");
    }
    Ok(())
}
