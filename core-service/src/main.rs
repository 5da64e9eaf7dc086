//! nids-score - batch scoring CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use nids_core::constants::{self, APP_NAME, APP_VERSION};
use nids_core::logic::alert::{self, ExportFormat};
use nids_core::logic::features::LayoutInfo;
use nids_core::logic::ingest::{self, synthetic, SyntheticConfig};
use nids_core::{Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "nids-score")]
#[command(about = "Score network flow records into severity-rated alerts")]
#[command(version = APP_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a CSV of flow observations
    Score {
        /// Input CSV with timestamp, byte_count, duration, source_port, dest_port
        #[arg(short, long)]
        input: PathBuf,
        /// Pipeline config (JSON); falls back to NIDS_PIPELINE_CONFIG, then the user config dir
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Where to write alerts; nothing is written when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (json, jsonl, csv)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// Print severity counts, top talkers and model metrics
        #[arg(long)]
        summary: bool,
    },
    /// Write explicit synthetic demo flows
    Synthetic {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, default_value_t = constants::DEFAULT_SYNTHETIC_ROWS)]
        rows: usize,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
    /// Print the feature layout and its hash
    Layout,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score { input, config, output, format, summary } => {
            score(&input, config, output.as_deref(), format, summary)
        }
        Commands::Synthetic { output, rows, seed } => write_synthetic(&output, rows, seed),
        Commands::Layout => {
            let info = LayoutInfo::current();
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    }
}

/// --config, then NIDS_PIPELINE_CONFIG, then the default location if it exists
fn resolve_config(explicit: Option<PathBuf>) -> Result<PipelineConfig> {
    let path = explicit
        .or_else(constants::pipeline_config_from_env)
        .or_else(|| constants::default_pipeline_config_path().filter(|p| p.exists()));

    match path {
        Some(path) => PipelineConfig::load(&path)
            .with_context(|| format!("loading pipeline config {}", path.display())),
        None => {
            log::info!("No pipeline config found, using defaults");
            Ok(PipelineConfig::default())
        }
    }
}

fn score(
    input: &Path,
    config: Option<PathBuf>,
    output: Option<&Path>,
    format: ExportFormat,
    summary: bool,
) -> Result<()> {
    log::info!("{} v{} - scoring {}", APP_NAME, APP_VERSION, input.display());

    let config = resolve_config(config)?;
    let pipeline = Pipeline::from_config(&config).context("loading model artifacts")?;

    let observations = ingest::read_observations(input)?;
    let alerts = pipeline.run(&observations)?;

    if let Some(output) = output {
        alert::export_alerts(&alerts, output, format)?;
    }

    if summary {
        print_summary(&alerts, &pipeline)?;
    } else if output.is_none() {
        alert::write_alerts(&alerts, std::io::stdout().lock(), format)?;
    }

    Ok(())
}

fn print_summary(alerts: &[alert::Alert], pipeline: &Pipeline) -> Result<()> {
    let report = serde_json::json!({
        "severity_source": pipeline.severity_source().as_str(),
        "scorer": pipeline.scorer_name(),
        "summary": alert::summarize(alerts),
        "by_severity": alert::count_by_severity(alerts),
        "top_talkers": alert::top_talkers(alerts, constants::DEFAULT_TOP_N),
        "metrics": alert::evaluate(alerts),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn write_synthetic(output: &Path, rows: usize, seed: u64) -> Result<()> {
    let config = SyntheticConfig { rows, seed, ..Default::default() };
    let flows = synthetic::generate(&config);
    let written = synthetic::write_csv(&flows, output)?;
    log::info!("Wrote {} synthetic flows to {}", written, output.display());
    Ok(())
}
