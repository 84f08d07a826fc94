//! Tone map command: HDR to 8-bit RGBA PNG.

use crate::TonemapArgs;
use anyhow::{Context, Result, bail};
use rgbe_io::ToneMap;
use rgbe_pixel::tonemap::exposure_for_peak;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info, trace};

/// Runs the tonemap command.
pub fn run(args: TonemapArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "tonemap::run");

    if !(args.gamma > 0.0) {
        bail!("gamma must be positive, got {}", args.gamma);
    }

    let hdr = super::load_image(&args.input)?;
    let image = &hdr.image;

    let exposure = if args.auto_exposure {
        let peak = image
            .to_float()
            .chunks_exact(3)
            .map(|px| px[0].max(px[1]).max(px[2]))
            .fold(0.0f32, f32::max);
        let exposure = exposure_for_peak(peak);
        debug!(peak, exposure, "auto exposure");
        exposure
    } else {
        args.exposure
    };

    let tone = ToneMap::new(exposure, args.gamma);
    info!(exposure = tone.exposure, gamma = tone.gamma, "Tone mapping");
    let ldr = image.to_ldr(&tone);

    write_png(&args.output, image.width, image.height, &ldr)?;

    if verbose > 0 {
        println!(
            "Wrote {} ({}x{}, exposure {}, gamma {})",
            args.output.display(),
            image.width,
            image.height,
            tone.exposure,
            tone.gamma
        );
    }
    Ok(())
}

/// Writes RGBA8 pixels as a PNG.
pub fn write_png(path: &Path, width: usize, height: usize, rgba: &[u8]) -> Result<()> {
    let width = u32::try_from(width).context("width exceeds PNG limits")?;
    let height = u32::try_from(height).context("height exceeds PNG limits")?;

    let file = File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().context("Failed to write PNG header")?;
    writer.write_image_data(rgba).context("Failed to write PNG data")?;
    writer.finish().context("Failed to finish PNG")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_png_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let ldr = ToneMap::default().apply_float(&[1.0, 0.5, 0.0, 0.0, 0.0, 0.0]);
        write_png(&path, 2, 1, &ldr).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
