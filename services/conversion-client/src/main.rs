//! `bomforge` command-line tool
//!
//! Runs conversions against the backend, manages conversion history, and
//! runs the hierarchy resolver and aggregation engine offline on saved mBOM
//! JSON files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};

use bomforge_conversion_client::{ConversionClient, ConversionPipeline, StatusPoller};
use bomforge_models::{BomData, ManufacturingBomItem};
use bomforge_utils::bom::{aggregate, normalize_items, to_csv, BomItemValidator, HierarchyResolver};
use bomforge_utils::{init_logging, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "bomforge")]
#[command(about = "eBOM to mBOM conversion and analysis")]
#[command(version)]
struct Cli {
    /// Conversion backend base URL (overrides configuration)
    #[arg(long, global = true, env = "BOMFORGE_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a BOM spreadsheet, wait for the conversion and summarize it
    Convert {
        file: PathBuf,
        /// Write the converted mBOM as CSV
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List past conversions
    History {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "20")]
        limit: u32,
    },
    /// Delete a conversion from history
    Delete { conversion_id: String },
    /// Summary statistics for a saved mBOM JSON file
    Stats { file: PathBuf },
    /// Resolved hierarchy graph for a saved mBOM JSON file
    Graph { file: PathBuf },
    /// Validation report for a saved mBOM JSON file
    Validate { file: PathBuf },
}

/// Saved mBOM files are either a bare item array or a full `BomData` payload
#[derive(Deserialize)]
#[serde(untagged)]
enum MbomFile {
    Items(Vec<ManufacturingBomItem>),
    Data(BomData),
}

impl MbomFile {
    fn into_items(self) -> Vec<ManufacturingBomItem> {
        match self {
            Self::Items(items) => items,
            Self::Data(data) => data.mbom_data.items,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    if let Some(api_url) = cli.api_url {
        config.backend.api_url = api_url;
    }

    init_logging(&config.logging).context("Failed to initialize logging")?;

    let resolver = HierarchyResolver::new(config.layout);

    match cli.command {
        Command::Convert { file, out } => {
            let client = ConversionClient::new(&config.backend)?;
            let poller = StatusPoller::new(client.clone(), &config.backend);
            let pipeline = ConversionPipeline::new(client, poller, resolver);

            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("Input path has no file name")?
                .to_string();
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let outcome = pipeline
                .run(&file_name, bytes, |status| {
                    info!(progress = status.progress, stage = ?status.current_stage, "Converting");
                })
                .await?;

            if !outcome.validation.is_valid {
                warn!(
                    errors = outcome.validation.error_count,
                    "Converted mBOM has validation errors"
                );
            }
            print_json(&outcome.stats)?;

            if let Some(out) = out {
                write_csv(&out, outcome.mbom_items())?;
            }
        }
        Command::History { search, page, limit } => {
            let client = ConversionClient::new(&config.backend)?;
            let history = client
                .get_conversion_history(page, limit, search.as_deref())
                .await?;
            print_json(&history)?;
        }
        Command::Delete { conversion_id } => {
            let client = ConversionClient::new(&config.backend)?;
            client.delete_conversion(&conversion_id).await?;
            info!(conversion_id = %conversion_id, "Conversion deleted");
        }
        Command::Stats { file } => {
            let items = read_items(&file)?;
            print_json(&aggregate(&items))?;
        }
        Command::Graph { file } => {
            let items = read_items(&file)?;
            print_json(&resolver.resolve(&items))?;
        }
        Command::Validate { file } => {
            let items = read_items(&file)?;
            print_json(&BomItemValidator::new().validate(&items))?;
        }
    }

    Ok(())
}

fn read_items(path: &Path) -> Result<Vec<ManufacturingBomItem>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: MbomFile =
        serde_json::from_str(&raw).with_context(|| format!("{} is not an mBOM JSON file", path.display()))?;
    Ok(normalize_items(&parsed.into_items()))
}

fn write_csv(path: &Path, items: &[ManufacturingBomItem]) -> Result<()> {
    let csv = to_csv(items)?;
    std::fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = items.len(), "CSV export written");
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
