//! Pack command: dump the raw pixel payload in a chosen format.
//!
//! Output is headerless, little-endian, row-major from the top row. Other
//! tools wrap it in their own containers.

use crate::{PackArgs, PackFormat};
use anyhow::{Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{info, trace};

/// Runs the pack command.
pub fn run(args: PackArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "pack::run");

    let hdr = super::load_image(&args.input)?;
    let image = &hdr.image;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create: {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);

    let written = write_payload(&mut writer, &hdr.image, args.format)?;
    writer.flush()?;

    info!(format = ?args.format, bytes = written, "Packed pixels");
    if verbose > 0 {
        println!(
            "Wrote {} ({}x{}, {:?}, {})",
            args.output.display(),
            image.width,
            image.height,
            args.format,
            super::format_size(written as u64)
        );
    }
    Ok(())
}

/// Writes the payload of `image` in `format`. Returns bytes written.
pub fn write_payload<W: Write>(writer: &mut W, image: &rgbe_io::DecodedImage, format: PackFormat) -> Result<usize> {
    let written = match format {
        PackFormat::Float => {
            let floats = image.to_float();
            for &v in &floats {
                writer.write_f32::<LittleEndian>(v)?;
            }
            floats.len() * 4
        }
        PackFormat::Rgb9e5 => {
            let words = image.to_rgb9e5();
            for &w in &words {
                writer.write_u32::<LittleEndian>(w)?;
            }
            words.len() * 4
        }
        PackFormat::Rgbe => {
            writer.write_all(&image.rgbe)?;
            image.rgbe.len()
        }
    };
    Ok(written)
}
