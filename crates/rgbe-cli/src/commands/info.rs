//! Image info command.
//!
//! Displays dimensions, header fields and optionally radiance statistics.

use crate::InfoArgs;
use anyhow::Result;
use std::fs;
use tracing::trace;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    for path in &args.input {
        trace!(path = %path.display(), "info::run");
        let file_size = fs::metadata(path)?.len();
        let hdr = super::load_image(path)?;
        let (header, image) = (&hdr.header, &hdr.image);

        println!("{}", path.display());
        println!("  Resolution: {}x{}", image.width, image.height);
        println!("  Pixels:     {}", image.width as u64 * image.height as u64);
        println!("  File size:  {}", super::format_size(file_size));
        println!("  Format:     {}", header.format);
        if let Some(program) = &header.program {
            println!("  Program:    {}", program);
        }
        if let Some(exposure) = header.exposure() {
            println!("  Exposure:   {}", exposure);
        }
        if let Some(gamma) = header.gamma() {
            println!("  Gamma:      {}", gamma);
        }

        if verbose > 0 {
            println!("  Orientation: {}", header.resolution);
            println!("  Data offset: {}", header.data_offset);
            if !header.fields.is_empty() {
                println!("  Header:");
                for (key, value) in &header.fields {
                    println!("    {}={}", key, value);
                }
            }
        }

        if args.stats {
            if let Some(stats) = super::channel_stats(&image.to_float()) {
                for (c, name) in ["R", "G", "B"].iter().enumerate() {
                    println!(
                        "  {}: min {:.6}  max {:.6}  mean {:.6}",
                        name, stats.min[c], stats.max[c], stats.mean[c]
                    );
                }
            }
        }

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}
