//! rgbe - Radiance HDR command line tool
//!
//! Inspect, tone map, repack and re-encode `.hdr` files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rgbe")]
#[command(author, version, about = "Radiance HDR image tool")]
#[command(long_about = "
Decode, inspect and convert Radiance HDR (.hdr / .pic) images.

Examples:
  rgbe info scene.hdr                       # Show dimensions and header
  rgbe info scene.hdr --stats               # Per-channel radiance stats
  rgbe tonemap scene.hdr -o preview.png     # 8-bit preview, exposure 1, gamma 2.2
  rgbe tonemap scene.hdr -o dark.png -e -1 -g 1.0
  rgbe pack scene.hdr -o scene.r9e5 -f rgb9e5
  rgbe encode scene.hdr -o flat.hdr --rle never
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Tone map to an 8-bit RGBA PNG
    #[command(visible_alias = "t")]
    Tonemap(TonemapArgs),

    /// Write raw pixel payload (float, RGB9_E5 or RGBE)
    #[command(visible_alias = "p")]
    Pack(PackArgs),

    /// Re-encode as Radiance HDR
    #[command(visible_alias = "e")]
    Encode(EncodeArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Show per-channel min/max/mean
    #[arg(short, long)]
    stats: bool,
}

#[derive(Args)]
struct TonemapArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Exposure in stops (1.0 = unchanged)
    #[arg(short, long, default_value = "1.0", allow_hyphen_values = true)]
    exposure: f32,

    /// Display gamma (1.0 = linear)
    #[arg(short, long, default_value = "2.2")]
    gamma: f32,

    /// Pick exposure so the brightest pixel maps to white
    #[arg(long, conflicts_with = "exposure")]
    auto_exposure: bool,
}

/// Raw payload layout for `pack`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PackFormat {
    /// Three little-endian f32 per pixel
    Float,
    /// One little-endian u32 per pixel
    Rgb9e5,
    /// Four bytes per pixel, as decoded
    Rgbe,
}

#[derive(Args)]
struct PackArgs {
    /// Input image
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Payload format
    #[arg(short, long, value_enum, default_value = "float")]
    format: PackFormat,
}

/// Scanline encoding for `encode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RleArg {
    /// RLE for widths 8..=32767
    Auto,
    /// RLE for every scanline
    Always,
    /// Flat scanlines
    Never,
}

#[derive(Args)]
struct EncodeArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Scanline encoding
    #[arg(long, value_enum, default_value = "auto")]
    rle: RleArg,

    /// Drop header fields from the input
    #[arg(long)]
    strip: bool,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Tonemap(args) => commands::tonemap::run(args, cli.verbose),
        Commands::Pack(args) => commands::pack::run(args, cli.verbose),
        Commands::Encode(args) => commands::encode::run(args, cli.verbose),
    }
}
