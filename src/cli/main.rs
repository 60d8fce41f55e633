use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use gps_mask::{config, exif, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "gps-mask",
    version,
    about = "Remove GPS geolocation from JPEG Exif metadata without changing file size"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Report what would be masked without writing files
    #[arg(long)]
    dry_run: bool,

    /// Delete each original after its masked copy is written and verified
    #[arg(long)]
    delete_original: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Display the GPS position of the image(s) and exit
    #[arg(long = "show-gps")]
    show_gps: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Load config
    let mut config = config::Config::load(cli.config.as_deref())?;

    // CLI flags override the config file
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if cli.delete_original {
        config.output.delete_original = true;
    }

    let images = pipeline::collect_images(&cli.paths, config.scan.follow_links);
    if images.is_empty() {
        anyhow::bail!("No JPEG files found in the specified paths.");
    }

    if cli.show_gps {
        for image_path in &images {
            print_gps(image_path);
        }
        return Ok(());
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN: no files will be modified");
    }

    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, total, image_path.display());

        let result = pipeline::process_image(image_path, &config);

        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else if result.masked {
            let verb = if config.output.dry_run { "Would mask" } else { "Masked" };
            log::info!("  {verb} {} GPS entries", result.entries);
            if let Some(ref out) = result.output_path {
                log::info!("  Output: {}", out.display());
            }
            if result.original_deleted {
                log::info!("  Original deleted");
            }
        } else if let Some(ref reason) = result.reason {
            log::info!("  Unchanged: {reason}");
        }

        results.push(result);
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "media_type": r.media_type,
                    "masked": r.masked,
                    "entries": r.entries,
                    "output_path": r.output_path.as_ref().map(|p| p.display().to_string()),
                    "original_deleted": r.original_deleted,
                    "reason": r.reason,
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let masked = results.iter().filter(|r| r.masked).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let unchanged = total - masked - failed;
    log::info!("Done: {masked} masked, {unchanged} unchanged, {failed} failed out of {total} images");

    Ok(())
}

/// Print the GPS position of one image as read by nom-exif.
fn print_gps(path: &std::path::Path) {
    match exif::read_gps(path) {
        Ok(gps) if gps.has_gps => {
            let lat = gps.latitude.unwrap_or(0.0);
            let lon = gps.longitude.unwrap_or(0.0);
            let note = if gps.is_neutral() { " (masked)" } else { "" };
            println!("{}: {lat:.6}, {lon:.6}{note}", path.display());
        }
        Ok(_) => println!("{}: no GPS", path.display()),
        Err(e) => log::error!("Failed to read {}: {e}", path.display()),
    }
}
