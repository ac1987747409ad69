use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

use dtm_kit::inspect::{list_tif_files, RasterInfo};
use dtm_kit::pins::csv_to_geojson;
use dtm_kit::preview::write_slope_preview;
use dtm_kit::slope::gradient_slope;
use dtm_kit::writer::slope_output_path;
use dtm_kit::{list_zip_files, read_elevation, GeoTiffWriter, ZipHandler};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Worker threads for multi-file commands (default: number of CPU cores)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a CSV of pins (longitude, latitude, name, description) to GeoJSON
    CsvToGeojson {
        #[arg(long, default_value = "data/pins/all_boulders.csv")]
        input: PathBuf,

        #[arg(long, default_value = "data/pins/all_boulders.geojson")]
        output: PathBuf,
    },

    /// Extract .tif rasters from every .zip in a directory
    ExtractTifs {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        #[arg(long, default_value = "data/extracted")]
        extract_dir: PathBuf,

        /// Number of rasters taken from each archive
        #[arg(long, default_value_t = 2, conflicts_with = "all")]
        limit: usize,

        /// Extract every raster instead of the first `--limit`
        #[arg(long)]
        all: bool,
    },

    /// Print CRS, shape, resolution and bounds of every .tif under a directory
    Inspect {
        #[arg(value_name = "DIR", default_value = "data")]
        dir: PathBuf,
    },

    /// Compute a slope GeoTIFF (degrees) from a DTM
    Slope {
        /// Input DTM GeoTIFF
        #[arg(long)]
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./processed")]
        out_dir: PathBuf,
    },

    /// Render the first DEM of a directory and its slope side by side as PNG
    SlopePreview {
        #[arg(long, default_value = "data/extracted")]
        data_dir: PathBuf,

        #[arg(short, long, default_value = "slope_preview.png")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Start the processing timer
    let start_time = Instant::now();

    // Configure the thread pool
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    // Dispatch the subcommand
    match &args.command {
        Command::CsvToGeojson { input, output } => run_csv_to_geojson(input, output)?,
        Command::ExtractTifs {
            data_dir,
            extract_dir,
            limit,
            all,
        } => {
            let limit = if *all { None } else { Some(*limit) };
            run_extract_tifs(data_dir, extract_dir, limit)?
        }
        Command::Inspect { dir } => run_inspect(dir)?,
        Command::Slope { input, out_dir } => run_slope(input, out_dir)?,
        Command::SlopePreview { data_dir, output } => run_slope_preview(data_dir, output)?,
    }

    // Report the elapsed time
    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    Ok(())
}

fn run_csv_to_geojson(input: &Path, output: &Path) -> Result<()> {
    info!("Converting pins: {:?} -> {:?}", input, output);

    // Create the parent directory of the output file
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Convert rows to Point features
    let count = csv_to_geojson(input, output)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!("Wrote {} features to {}", count, output.display());
    Ok(())
}

fn run_extract_tifs(data_dir: &Path, extract_dir: &Path, limit: Option<usize>) -> Result<()> {
    // Create the output directory
    fs::create_dir_all(extract_dir)?;

    let zip_files = list_zip_files(data_dir)
        .with_context(|| format!("Failed to list archives in {}", data_dir.display()))?;
    info!("Found {} ZIP files", zip_files.len());

    // Sequential: a later archive overwrites entries of the same name
    let mut errors = Vec::new();
    let mut extracted = 0;
    for zip_path in &zip_files {
        match extract_from_zip(zip_path, extract_dir, limit) {
            Ok(count) => extracted += count,
            Err(e) => errors.push(format!("{}: {:#}", zip_path.display(), e)),
        }
    }

    info!("Extracted {} rasters into {:?}", extracted, extract_dir);

    // Report every failed archive before giving up
    if !errors.is_empty() {
        error!("Failed to process {} archives:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        anyhow::bail!("{} archives failed to process", errors.len());
    }

    Ok(())
}

fn extract_from_zip(zip_path: &Path, extract_dir: &Path, limit: Option<usize>) -> Result<usize> {
    // List rasters in the archive
    let handler = ZipHandler::new(zip_path);
    let tifs = handler.list_tifs()?;

    let name = zip_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{} contains {} .tif files.", name, tifs.len());

    // Take the first `limit` entries
    let subset = match limit {
        Some(limit) => &tifs[..limit.min(tifs.len())],
        None => &tifs[..],
    };
    let written = handler.extract(subset, extract_dir)?;

    Ok(written.len())
}

fn run_inspect(dir: &Path) -> Result<()> {
    let tif_files =
        list_tif_files(dir).with_context(|| format!("Failed to walk {}", dir.display()))?;
    info!("Found {} .tif files", tif_files.len());

    // parallel read, printed in path order
    let infos: Vec<_> = tif_files
        .par_iter()
        .map(|path| RasterInfo::read(path))
        .collect();

    // Print results, counting failures
    let mut failed = 0;
    for (path, info) in tif_files.iter().zip(infos) {
        match info {
            Ok(info) => println!("{}", info),
            Err(e) => {
                failed += 1;
                error!("Failed to read {:?}: {}", path, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} files could not be read", failed);
    }
    Ok(())
}

fn run_slope(input: &Path, out_dir: &Path) -> Result<()> {
    // Create the output directory
    fs::create_dir_all(out_dir)?;

    // Read the DTM and compute slope
    info!("Processing DTM: {:?}", input);
    let dtm = read_elevation(input)
        .with_context(|| format!("Failed to read DTM {}", input.display()))?;
    let slope = gradient_slope(&dtm)?;

    // Write the slope GeoTIFF
    let slope_path = slope_output_path(input, out_dir);
    GeoTiffWriter::new().write(&slope, &slope_path)?;

    println!("Slope saved: {}", slope_path.display());
    Ok(())
}

fn run_slope_preview(data_dir: &Path, output: &Path) -> Result<()> {
    match write_slope_preview(data_dir, output)? {
        Some(dem) => println!("Preview of {} saved: {}", dem.display(), output.display()),
        None => println!("No .tif files found in {}.", data_dir.display()),
    }
    Ok(())
}
