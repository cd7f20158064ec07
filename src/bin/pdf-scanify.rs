//! PDF Scanify CLI tool
//!
//! A command-line tool for making PDFs look like scanned paper.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pdf_scanify::config::DEFAULT_SCANNER_NAME;
use pdf_scanify::pdf::extract_metadata;
use pdf_scanify::{Pipeline, ProgressCallback, ScanConfig};

/// PDF Scanify - Make a PDF look like it was scanned
#[derive(Parser)]
#[command(name = "pdf-scanify")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Typical office scan
    pdf-scanify scan report.pdf report_scanned.pdf --rotate --grayscale --add-noise --add-shadow

    # Harsh black-and-white fax look with two creases
    pdf-scanify scan in.pdf out.pdf --bw --bw-threshold 180 --fold-marks --fold-count 2

    # Reproducible output
    pdf-scanify scan in.pdf out.pdf --rotate --add-noise --seed 42

    # Show page count and metadata
    pdf-scanify info out.pdf")]
struct Cli {
    /// Log more detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF into a scanned-looking PDF
    Scan(ScanArgs),

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Input PDF file
    input: PathBuf,

    /// Output PDF file path
    output: PathBuf,

    /// DPI for the scanned effect
    #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(u32).range(72..=300))]
    dpi: u32,

    /// Add slight random rotation
    #[arg(long)]
    rotate: bool,

    /// Maximum rotation angle in degrees
    #[arg(long, default_value_t = 1.5)]
    max_rotation: f32,

    /// Convert to grayscale
    #[arg(long)]
    grayscale: bool,

    /// Convert to black and white
    #[arg(long)]
    bw: bool,

    /// Luminance at or above which a pixel becomes white
    #[arg(long, default_value_t = 200)]
    bw_threshold: u8,

    /// Add noise to simulate scanner artifacts
    #[arg(long)]
    add_noise: bool,

    /// Percentage of sampled pixels that receive noise
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(0..=100))]
    noise_factor: u8,

    /// Add fold marks to pages
    #[arg(long)]
    fold_marks: bool,

    /// Number of fold marks to add
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    fold_count: u32,

    /// Add subtle shadow near edges
    #[arg(long)]
    add_shadow: bool,

    /// Apply slight blur (0-2.0)
    #[arg(long, default_value_t = 0.0)]
    blur: f32,

    /// JPEG quality for compression artifacts
    #[arg(long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Scanner name for metadata
    #[arg(long, default_value = DEFAULT_SCANNER_NAME)]
    scanner_name: String,

    /// Seed for reproducible effects
    #[arg(long)]
    seed: Option<u64>,

    /// Open the output file after creation
    #[arg(long)]
    open: bool,
}

impl ScanArgs {
    fn to_config(&self) -> ScanConfig {
        ScanConfig {
            dpi: self.dpi,
            rotate: self.rotate,
            max_rotation_degrees: self.max_rotation,
            grayscale: self.grayscale,
            black_and_white: self.bw,
            black_and_white_threshold: self.bw_threshold,
            add_noise: self.add_noise,
            noise_factor: self.noise_factor,
            fold_marks: self.fold_marks,
            fold_count: self.fold_count,
            add_shadow: self.add_shadow,
            blur_radius: self.blur,
            jpeg_quality: self.quality,
            scanner_name: self.scanner_name.clone(),
            seed: self.seed,
        }
    }
}

/// Prints one line per finished page
struct ConsoleProgress;

impl ProgressCallback for ConsoleProgress {
    fn on_page_start(&self, _index: usize, _total: usize) {}

    fn on_page_complete(&self, index: usize, total: usize) {
        eprintln!("  page {}/{}", index + 1, total);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Scan(args) => cmd_scan(args),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Convert a PDF into a scanned-looking PDF
fn cmd_scan(args: ScanArgs) -> Result<()> {
    if !args.input.exists() {
        bail!("Input file not found: {}", args.input.display());
    }

    let pipeline = Pipeline::new(args.to_config());
    let stage_names: Vec<&str> = pipeline.stages().iter().map(|s| s.name()).collect();
    eprintln!(
        "Scanning {} at {} DPI [{}]...",
        args.input.display(),
        args.dpi,
        stage_names.join(", ")
    );

    let report = pipeline
        .scan_file(&args.input, &args.output, &ConsoleProgress)
        .with_context(|| format!("Failed to scan {}", args.input.display()))?;

    eprintln!(
        "Created scanned-looking PDF: {} ({} pages)",
        args.output.display(),
        report.page_count
    );

    if args.open {
        open_file(&args.output)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);
    for (key, value) in &metadata.info {
        println!("{}: {}", key, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_command_line_mode() {
        let cli = Cli::parse_from(["pdf-scanify", "scan", "in.pdf", "out.pdf"]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let config = args.to_config();
        assert_eq!(config.dpi, 150);
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.blur_radius, 0.0);
        assert_eq!(config.scanner_name, DEFAULT_SCANNER_NAME);
        assert!(config.stages().is_empty());
    }

    #[test]
    fn test_cli_flags_enable_stages() {
        let cli = Cli::parse_from([
            "pdf-scanify", "scan", "in.pdf", "out.pdf", "--rotate", "--grayscale", "--fold-marks",
            "--fold-count", "3", "--blur", "0.7", "--seed", "9",
        ]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let config = args.to_config();
        assert_eq!(config.fold_count, 3);
        assert_eq!(config.seed, Some(9));
        let names: Vec<&str> = config.stages().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["rotate", "grayscale", "fold", "blur"]);
    }

    #[test]
    fn test_cli_rejects_out_of_range_dpi() {
        let result = Cli::try_parse_from(["pdf-scanify", "scan", "in.pdf", "out.pdf", "--dpi", "20"]);
        assert!(result.is_err());
    }
}
