//! drillstat CLI - zonal statistics over raster band stacks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use drillstat_algorithms::drill::{drill_zones, run_request, DrillParams, DrillRequest, DrillResult};
use drillstat_algorithms::metrics::RunMetrics;
use drillstat_algorithms::statistics::{ClipRange, Statistic};
use drillstat_core::io::read_band_stack;
use drillstat_core::vector::FeatureCollection;
use drillstat_core::{MemoryRaster, RasterSource};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "drillstat")]
#[command(author, version, about = "Zonal statistics over raster band stacks", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a band stack
    Info {
        /// Input GeoTIFF
        input: PathBuf,
    },
    /// Drill every feature of a GeoJSON file
    Drill {
        /// Input GeoTIFF band stack
        input: PathBuf,
        /// GeoJSON FeatureCollection, Feature or Geometry
        zones: PathBuf,
        /// Bands to drill, 1-based and comma separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        bands: Vec<usize>,
        /// Read only the endpoints of every N bands and interpolate the rest
        #[arg(short, long, default_value = "1")]
        strides: i64,
        /// Number of deciles per band
        #[arg(short, long, default_value = "0")]
        deciles: usize,
        /// Report the fraction of valid pixels inside the clip range instead of the mean
        #[arg(long)]
        coverage: bool,
        /// Lower clip bound (inclusive)
        #[arg(long, allow_hyphen_values = true)]
        clip_lower: Option<f32>,
        /// Upper clip bound (inclusive)
        #[arg(long, allow_hyphen_values = true)]
        clip_upper: Option<f32>,
        /// Buffer applied to each zone, in pixels
        #[arg(long)]
        buffer: Option<f64>,
        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a JSON drill request
    Request {
        /// Request file
        request: PathBuf,
        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_stack(path: &Path) -> Result<MemoryRaster> {
    let pb = spinner("Reading band stack...");
    let raster = read_band_stack(path)
        .with_context(|| format!("Failed to read band stack {}", path.display()))?;
    pb.finish_and_clear();
    info!(
        "Input: {} x {}, {} bands",
        raster.cols(),
        raster.rows(),
        raster.band_count()
    );
    Ok(raster)
}

fn result_json(result: &DrillResult) -> Value {
    let rows: Vec<Value> = result
        .table
        .iter_rows()
        .map(|row| json!(row))
        .collect();
    json!({
        "shape": result.shape(),
        "nodata": result.nodata,
        "rows": rows,
        "metrics": result.metrics,
    })
}

fn write_json(value: &Value, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Results saved to: {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn done(zones: usize, failed: usize, metrics: &RunMetrics, elapsed: std::time::Duration) {
    info!("{} zones drilled, {} failed", zones, failed);
    info!(
        "Read {} bytes, user {:.3} s, system {:.3} s",
        metrics.bytes_read,
        metrics.user_time_nanos as f64 * 1e-9,
        metrics.sys_time_nanos as f64 * 1e-9
    );
    info!("Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster = read_stack(&input)?;
            let georef = raster.georeference();
            let bounds = georef.bounds();

            println!("File: {}", input.display());
            println!(
                "Dimensions: {} x {} ({} bands)",
                georef.width,
                georef.height,
                raster.band_count()
            );
            println!("Data type: {:?}", raster.data_type());
            println!(
                "Pixel size: {} x {}",
                georef.transform.pixel_width, georef.transform.pixel_height
            );
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = &georef.crs {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
        }

        Commands::Drill {
            input,
            zones,
            bands,
            strides,
            deciles,
            coverage,
            clip_lower,
            clip_upper,
            buffer,
            output,
        } => {
            let text = std::fs::read_to_string(&zones)
                .with_context(|| format!("Failed to read {}", zones.display()))?;
            let collection =
                FeatureCollection::from_geojson(&text).context("Failed to parse zones")?;
            let features = collection.zones();
            if features.is_empty() {
                anyhow::bail!("{} has no features with a geometry", zones.display());
            }
            let zones = features;

            let raster = read_stack(&input)?;
            let bands = if bands.is_empty() {
                (1..=raster.band_count()).collect()
            } else {
                bands
            };
            let statistic = if coverage {
                Statistic::CoverageFraction
            } else {
                Statistic::Mean
            };
            let clip = ClipRange::new(
                clip_lower.unwrap_or(f32::MIN),
                clip_upper.unwrap_or(f32::MAX),
            );
            let mut params = DrillParams::new(bands)
                .with_band_strides(strides)
                .with_decile_count(deciles)
                .with_statistic(statistic)
                .with_clip(clip);
            if let Some(buffer) = buffer {
                params.zone.buffer_pixels = buffer;
            }

            let start = Instant::now();
            let pb = spinner(&format!("Drilling {} zones...", zones.len()));
            let results = drill_zones(&raster, &zones, &params);
            pb.finish_and_clear();

            let mut total = RunMetrics::default();
            let mut failed = 0;
            let records: Vec<Value> = zones
                .iter()
                .zip(&results)
                .enumerate()
                .map(|(i, (zone, result))| {
                    let id = zone.id.clone().unwrap_or_else(|| i.to_string());
                    match result {
                        Ok(result) => {
                            total += result.metrics;
                            let mut record = result_json(result);
                            record["id"] = json!(id);
                            record
                        }
                        Err(e) => {
                            failed += 1;
                            warn!("Zone {} failed: {}", id, e);
                            json!({ "id": id, "error": e.to_string() })
                        }
                    }
                })
                .collect();

            write_json(&Value::Array(records), output.as_deref())?;
            done(zones.len(), failed, &total, start.elapsed());
        }

        Commands::Request { request, output } => {
            let text = std::fs::read_to_string(&request)
                .with_context(|| format!("Failed to read {}", request.display()))?;
            let request = DrillRequest::from_json(&text).context("Failed to parse request")?;

            let start = Instant::now();
            let pb = spinner("Drilling...");
            let result = run_request(&request).context("Drill request failed")?;
            pb.finish_and_clear();

            write_json(&result_json(&result), output.as_deref())?;
            done(1, 0, &result.metrics, start.elapsed());
        }
    }

    Ok(())
}
