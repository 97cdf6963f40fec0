//! Unity bundle asset extractor CLI
//!
//! Reads decoded bundle dumps and writes every contained asset to
//! disk in the most faithful format available, falling back through
//! field dumps and raw payloads when a native export is impossible.

use anyhow::{Context, Result, bail};
use bundlerip_core::Bundle;
use bundlerip_extract::{Progress, SessionReport, extract_bundle_with_progress};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bundlerip")]
#[command(about = "Extract assets from decoded Unity bundle dumps")]
#[command(version)]
struct Cli {
    /// Bundle dump to extract (prompted for when omitted)
    bundle: Option<PathBuf>,

    /// Output directory (prompted for when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extract every bundle dump in a directory
    #[arg(long, value_name = "DIR", conflicts_with = "bundle")]
    batch: Option<PathBuf>,

    /// Print bundle contents without extracting
    #[arg(long)]
    info: bool,

    /// Verbose diagnostic logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(dir) = cli.batch {
        let output = match cli.output {
            Some(path) => path,
            None => prompt("Please enter the output folder path: ")?,
        };
        return run_batch(&dir, &output);
    }

    let bundle_path = match cli.bundle {
        Some(path) => path,
        None => prompt("Please enter the bundle dump path: ")?,
    };
    if !bundle_path.is_file() {
        bail!(
            "File '{}' not found. Please check the path and try again.",
            bundle_path.display()
        );
    }

    if cli.info {
        return run_info(&bundle_path);
    }

    let output = match cli.output {
        Some(path) => path,
        None => prompt("Please enter the output folder path: ")?,
    };
    let report = run_one(&bundle_path, &output)?;
    print_summary(&report);
    Ok(())
}

fn prompt(message: &str) -> Result<PathBuf> {
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("Path cannot be empty. Please provide a valid path.");
    }
    Ok(PathBuf::from(trimmed))
}

/// Progress observer backed by an indicatif bar
struct BarProgress(ProgressBar);

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self(bar)
    }
}

impl Progress for BarProgress {
    fn begin(&self, total: usize) {
        self.0.set_length(total as u64);
        self.0.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn asset_done(&self, processed: usize, _total: usize) {
        self.0.set_position(processed as u64);
    }

    fn finish(&self) {
        self.0.finish_with_message("Done");
    }
}

fn run_one(bundle_path: &Path, output: &Path) -> Result<SessionReport> {
    let bundle = Bundle::from_json_file(bundle_path).with_context(|| {
        format!(
            "Could not load bundle '{}'. Is it a decoded bundle dump?",
            bundle_path.display()
        )
    })?;
    println!("\nTotal objects found in bundle: {}\n", bundle.len());

    let progress = BarProgress::new();
    let report = extract_bundle_with_progress(&bundle, output, &progress)
        .with_context(|| format!("Extraction into '{}' failed", output.display()))?;
    Ok(report)
}

fn print_summary(report: &SessionReport) {
    println!(
        "\nExtraction completed. Files saved to '{}'.",
        report.output_root.display()
    );
    println!(
        "Summary: {} extracted, {} partial, {} failed.",
        report.succeeded, report.partial, report.failed
    );
}

fn run_batch(dir: &Path, output: &Path) -> Result<()> {
    let mut dumps: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Could not read directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    dumps.sort();
    if dumps.is_empty() {
        bail!("No bundle dumps (*.json) found in '{}'", dir.display());
    }
    println!("Extracting {} bundles from '{}'", dumps.len(), dir.display());

    let bar = ProgressBar::new(dumps.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, Result<SessionReport>)> = dumps
        .par_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "bundle".to_string());
            let result = Bundle::from_json_file(path)
                .with_context(|| format!("Could not load bundle '{}'", path.display()))
                .and_then(|bundle| {
                    extract_bundle_with_progress(
                        &bundle,
                        &output.join(&stem),
                        &bundlerip_extract::NoProgress,
                    )
                    .with_context(|| format!("Extraction of '{}' failed", path.display()))
                });
            bar.inc(1);
            if let Err(ref e) = result {
                bar.suspend(|| eprintln!("Error {}: {:#}", path.display(), e));
            }
            (path.clone(), result)
        })
        .collect();
    bar.finish_with_message("Done");

    let mut succeeded = 0usize;
    let mut partial = 0usize;
    let mut failed_assets = 0usize;
    let mut failed_bundles = 0usize;
    for (_, result) in &results {
        match result {
            Ok(report) => {
                succeeded += report.succeeded;
                partial += report.partial;
                failed_assets += report.failed;
            }
            Err(_) => failed_bundles += 1,
        }
    }
    println!(
        "\nBatch complete: {} extracted, {} partial, {} failed across {} bundles.",
        succeeded,
        partial,
        failed_assets,
        results.len()
    );
    if failed_bundles > 0 {
        bail!("{} bundle(s) could not be extracted", failed_bundles);
    }
    Ok(())
}

fn run_info(bundle_path: &Path) -> Result<()> {
    let bundle = Bundle::from_json_file(bundle_path).with_context(|| {
        format!(
            "Could not load bundle '{}'. Is it a decoded bundle dump?",
            bundle_path.display()
        )
    })?;

    println!("Bundle: {}", bundle_path.display());
    println!("  Engine version: {}", bundle.engine_version);
    println!("  Platform: {}", bundle.platform);
    println!("  Objects: {}", bundle.len());

    let mut counts = std::collections::BTreeMap::new();
    for asset in bundle.assets() {
        *counts.entry(asset.kind.name().to_string()).or_insert(0usize) += 1;
    }
    for (kind, count) in &counts {
        println!("    {}: {}", kind, count);
    }

    let containers = bundle.container_paths();
    if !containers.is_empty() {
        println!("  Container paths:");
        for path in containers {
            println!("    {}", path);
        }
    }

    let deps = bundle.dependencies();
    if !deps.is_empty() {
        println!("  Dependencies:");
        for edge in deps {
            println!("    {} -> {}", edge.from, edge.to);
        }
    }
    Ok(())
}
