//! Encode command: re-encode a Radiance HDR file.

use crate::{EncodeArgs, RleArg};
use anyhow::{Context, Result};
use rgbe_io::{EncodeOptions, RleMode};
use tracing::{debug, trace};

/// Runs the encode command.
pub fn run(args: EncodeArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "encode::run");

    let hdr = super::load_image(&args.input)?;
    let options = EncodeOptions::default().with_rle(match args.rle {
        RleArg::Auto => RleMode::Auto,
        RleArg::Always => RleMode::Always,
        RleArg::Never => RleMode::Never,
    });
    debug!(rle = ?options.rle, strip = args.strip, "Encoding");

    if args.strip {
        rgbe_io::write(&args.output, &hdr.image, &options)
    } else {
        rgbe_io::write_with_header(&args.output, &hdr, &options)
    }
    .with_context(|| format!("Failed to save: {}", args.output.display()))?;

    if verbose > 0 {
        println!("Encoded {} -> {}", args.input.display(), args.output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(input: PathBuf, output: PathBuf, rle: RleArg, strip: bool) -> EncodeArgs {
        EncodeArgs { input, output, rle, strip }
    }

    #[test]
    fn test_reencode_flat_and_strip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.hdr");
        let dst = dir.path().join("dst.hdr");

        let rgbe: Vec<u8> = [90u8, 80, 200, 131].repeat(16 * 2);
        let bytes = rgbe_io::encode_hdr(
            16,
            2,
            &rgbe,
            &EncodeOptions::default().with_field("SOFTWARE", "test"),
        )
        .unwrap();
        std::fs::write(&src, bytes).unwrap();

        run(args(src.clone(), dst.clone(), RleArg::Never, false), 0).unwrap();
        let kept = rgbe_io::read(&dst).unwrap();
        assert_eq!(kept.image.rgbe, rgbe);
        assert_eq!(kept.header.field("SOFTWARE"), Some("test"));

        run(args(src, dst.clone(), RleArg::Always, true), 0).unwrap();
        let stripped = rgbe_io::read(&dst).unwrap();
        assert_eq!(stripped.image.rgbe, rgbe);
        assert!(stripped.header.fields.is_empty());
    }
}
