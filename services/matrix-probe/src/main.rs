//! Contact-matrix probe.
//!
//! Opens a file from its file-stat and genome metadata, drives one chart to
//! the requested view and prints a JSON summary of the rendered batch:
//! - Matrix data from a fixture directory or a matrix server
//! - Optional chromosome pair and pixel click for detail views
//! - Normalization, matrix type and fragment-unit switches

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use contact_engine::{
    CacheStats, ChartController, EngineConfig, HicSession, HttpMatrixSource, InMemoryMatrixSource,
    MatrixSource, RenderBatch,
};
use hic_common::{BinUnit, ColorDomain, MatrixType, NormalizationMethod, ViewState};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "matrix-probe")]
#[command(about = "Render one view of a Hi-C contact matrix and summarize it")]
struct Args {
    /// File-stat JSON (normalizations, chromosomes, chrorder, resolutions)
    #[arg(long, env = "HIC_FILE_STAT")]
    file_stat: PathBuf,

    /// Genome metadata JSON
    #[arg(long, env = "HIC_GENOME")]
    genome: PathBuf,

    /// Directory of matrix fixture files (*.json)
    #[arg(long, env = "HIC_FIXTURE_DIR")]
    fixtures: Option<PathBuf>,

    /// Matrix server base URL (used when no fixture directory is given)
    #[arg(long, env = "HIC_SERVER_URL")]
    server: Option<String>,

    /// Engine configuration YAML
    #[arg(long, env = "HIC_CONFIG")]
    config: Option<PathBuf>,

    /// Chromosome on the X axis; opens the chromosome-pair view
    #[arg(short = 'x', long)]
    chromosome_x: Option<String>,

    /// Chromosome on the Y axis (defaults to the X chromosome)
    #[arg(short = 'y', long)]
    chromosome_y: Option<String>,

    /// Pixel clicked in the chromosome-pair view, as "x,y"
    #[arg(long, value_parser = parse_pixel)]
    pixel: Option<(f64, f64)>,

    /// Normalization method (NONE, VC, VC_SQRT, KR, ...)
    #[arg(long)]
    normalization: Option<String>,

    /// Matrix type (observed, oe, expected)
    #[arg(long)]
    matrix_type: Option<String>,

    /// Restriction enzyme; switches detail views to fragment units
    #[arg(long)]
    enzyme: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_pixel(s: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got {:?}", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

/// What gets printed for the rendered view.
#[derive(Debug, Serialize)]
struct Summary {
    view: ViewState,
    generation: u64,
    resolution: u32,
    unit: BinUnit,
    cells: usize,
    extent: (f64, f64),
    domain: Option<ColorDomain>,
    fragment_cache: CacheStats,
}

impl Summary {
    fn new(batch: &RenderBatch, fragment_cache: CacheStats) -> Self {
        Self {
            view: batch.view.clone(),
            generation: batch.generation,
            resolution: batch.resolution,
            unit: batch.unit,
            cells: batch.cells.len(),
            extent: batch.extent(),
            domain: batch.domain,
            fragment_cache,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::from_env(),
    };

    let file_stat = read_json(&args.file_stat)?;
    let genome = read_json(&args.genome)?;
    let source = open_source(&args, &config)?;

    let session = Arc::new(HicSession::open(&file_stat, &genome, source, config)?);
    let chart = ChartController::new(session.clone());

    if let Some(name) = &args.normalization {
        chart
            .set_normalization(NormalizationMethod::from_str(name))
            .await?;
    }
    if let Some(name) = &args.matrix_type {
        chart.set_matrix_type(MatrixType::from_str(name)).await;
    }
    if let Some(enzyme) = &args.enzyme {
        chart
            .set_unit(BinUnit::Fragment, Some(enzyme.clone()))
            .await?;
    }

    if let Some(x) = &args.chromosome_x {
        let y = args.chromosome_y.as_deref().unwrap_or(x);
        chart.open_chromosome_pair(x, y).await?;
        if let Some((px, py)) = args.pixel {
            chart.position_from_pixel(px, py).await?;
        }
    } else if args.pixel.is_some() {
        bail!("--pixel needs a chromosome pair (--chromosome-x)");
    }

    info!(view = %chart.current_view().await, "Loading view");

    let Some(batch) = chart.load().await? else {
        bail!("load was superseded before it finished");
    };

    let summary = Summary::new(&batch, session.fragment_cache_stats().await);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn open_source(args: &Args, config: &EngineConfig) -> Result<Arc<dyn MatrixSource>> {
    if let Some(dir) = &args.fixtures {
        info!(dir = %dir.display(), "Using fixture matrix source");
        return Ok(Arc::new(InMemoryMatrixSource::from_fixture_dir(dir)?));
    }
    if let Some(url) = &args.server {
        info!(url = %url, "Using HTTP matrix source");
        return Ok(Arc::new(HttpMatrixSource::new(url, config)?));
    }
    bail!("either --fixtures or --server is required")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pixel() {
        assert_eq!(parse_pixel("260.5, 62.75").unwrap(), (260.5, 62.75));
        assert!(parse_pixel("260.5").is_err());
        assert!(parse_pixel("a,b").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "matrix-probe",
            "--file-stat",
            "stat.json",
            "--genome",
            "genome.json",
            "--fixtures",
            "fixtures",
            "-x",
            "chr1",
            "-y",
            "chr2",
            "--pixel",
            "10,20",
        ])
        .unwrap();
        assert_eq!(args.chromosome_x.as_deref(), Some("chr1"));
        assert_eq!(args.pixel, Some((10.0, 20.0)));
        assert_eq!(args.log_level, "info");
    }
}
