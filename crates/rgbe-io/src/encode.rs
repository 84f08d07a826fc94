//! Radiance HDR writing.
//!
//! Writes `#?RADIANCE`, `FORMAT=32-bit_rle_rgbe`, caller fields, a blank
//! line and `-Y <height> +X <width>`, then one scanline per row. Scanlines
//! are new-style RLE or flat according to [`RleMode`]. Whatever this module
//! writes decodes back to the same RGBE bytes.

use crate::header::{FORMAT_RGBE, HDR_MAGIC};
use crate::scanline::{MAX_RLE_WIDTH, ScanlineEncoding};
use crate::{HdrError, HdrResult};
use rgbe_pixel::float_to_rgbe;
use std::io::Write;
use tracing::{debug, trace};

/// Shortest run worth a run packet.
const MIN_RUN: usize = 4;
/// Longest run packet (`128 + 127 = 255`).
const MAX_RUN: usize = 127;
/// Longest literal packet.
const MAX_LITERAL: usize = 128;

/// Scanline encoding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RleMode {
    /// New-style RLE for widths in `8..=0x7fff`, flat otherwise.
    #[default]
    Auto,
    /// New-style RLE for every scanline.
    Always,
    /// Flat quads only.
    Never,
}

/// Options for [`encode_hdr`].
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Scanline encoding policy.
    pub rle: RleMode,
    /// Program identifier written after `#?`.
    pub program: String,
    /// Extra `KEY=VALUE` header lines. `FORMAT` entries are skipped.
    pub fields: Vec<(String, String)>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            rle: RleMode::Auto,
            program: "RADIANCE".to_string(),
            fields: Vec::new(),
        }
    }
}

impl EncodeOptions {
    /// Sets the scanline encoding policy.
    pub fn with_rle(mut self, rle: RleMode) -> Self {
        self.rle = rle;
        self
    }

    /// Appends a header field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }
}

/// Encodes an RGBE buffer as a complete Radiance HDR file.
///
/// # Errors
///
/// - [`HdrError::InvalidDimensions`] if a dimension is zero, `rgbe` is not
///   `width * height * 4` bytes, or [`RleMode::Always`] is asked for a
///   width above `0x7fff`.
/// - [`HdrError::Encode`] if a flat scanline would contain a pixel that
///   reads back as a repeat marker or RLE signature and new-style RLE
///   cannot be used instead.
pub fn encode_hdr(width: usize, height: usize, rgbe: &[u8], options: &EncodeOptions) -> HdrResult<Vec<u8>> {
    let mut out = Vec::with_capacity(64 + rgbe.len());
    write_hdr(&mut out, width, height, rgbe, options)?;
    Ok(out)
}

/// Converts linear float triples to RGBE and encodes them.
pub fn encode_float_hdr(width: usize, height: usize, rgb: &[f32], options: &EncodeOptions) -> HdrResult<Vec<u8>> {
    if width.checked_mul(height).and_then(|p| p.checked_mul(3)) != Some(rgb.len()) {
        return Err(HdrError::InvalidDimensions(format!(
            "{}x{} image needs {} floats, got {}",
            width,
            height,
            width.saturating_mul(height).saturating_mul(3),
            rgb.len()
        )));
    }
    encode_hdr(width, height, &float_to_rgbe(rgb), options)
}

/// Writes an RGBE buffer as a Radiance HDR stream.
pub fn write_hdr<W: Write>(
    writer: &mut W,
    width: usize,
    height: usize,
    rgbe: &[u8],
    options: &EncodeOptions,
) -> HdrResult<()> {
    trace!(width, height, rle = ?options.rle, "write_hdr");

    if width == 0 || height == 0 {
        return Err(HdrError::InvalidDimensions(format!("{}x{} image", width, height)));
    }
    let expected = width.checked_mul(height).and_then(|p| p.checked_mul(4));
    if expected != Some(rgbe.len()) {
        return Err(HdrError::InvalidDimensions(format!(
            "{}x{} image needs {} RGBE bytes, got {}",
            width,
            height,
            width.saturating_mul(height).saturating_mul(4),
            rgbe.len()
        )));
    }
    if options.rle == RleMode::Always && width > MAX_RLE_WIDTH {
        return Err(HdrError::InvalidDimensions(format!(
            "width {} exceeds RLE limit {}",
            width, MAX_RLE_WIDTH
        )));
    }

    check_header_text(options)?;

    writeln!(writer, "{}{}", HDR_MAGIC, options.program)?;
    write_header_field(writer, "FORMAT", FORMAT_RGBE)?;
    for (key, value) in &options.fields {
        if key != "FORMAT" {
            write_header_field(writer, key, value)?;
        }
    }
    writeln!(writer)?;
    writeln!(writer, "-Y {} +X {}", height, width)?;

    let prefer_rle = match options.rle {
        RleMode::Auto => (8..=MAX_RLE_WIDTH).contains(&width),
        RleMode::Always => true,
        RleMode::Never => false,
    };

    let mut channel = vec![0u8; width];
    let mut packets = Vec::with_capacity(width * 2);
    let mut rle_rows = 0usize;

    for (row, scanline) in rgbe.chunks_exact(width * 4).enumerate() {
        let use_rle = prefer_rle || (flat_is_ambiguous(scanline) && fallback_allowed(options.rle, width, row)?);
        if use_rle {
            writer.write_all(&[2, 2, (width >> 8) as u8, (width & 0xff) as u8])?;
            for c in 0..4 {
                for (dst, px) in channel.iter_mut().zip(scanline.chunks_exact(4)) {
                    *dst = px[c];
                }
                packets.clear();
                encode_rle_channel(&channel, &mut packets);
                writer.write_all(&packets)?;
            }
            rle_rows += 1;
        } else {
            writer.write_all(scanline)?;
        }
    }

    debug!(width, height, rle_rows, flat_rows = height - rle_rows, "encoded HDR body");
    Ok(())
}

/// Whether new-style RLE may replace an ambiguous flat scanline.
fn fallback_allowed(mode: RleMode, width: usize, row: usize) -> HdrResult<bool> {
    if mode != RleMode::Never && width <= MAX_RLE_WIDTH {
        return Ok(true);
    }
    Err(HdrError::Encode(format!(
        "scanline {} holds pixels a flat scanline cannot represent",
        row
    )))
}

/// True when raw quads would be misread: a `(1, 1, 1, n)` pixel reads as a
/// repeat marker, and a leading `2, 2, hi, lo` reads as a new-style
/// signature.
fn flat_is_ambiguous(scanline: &[u8]) -> bool {
    let starts_like_rle = matches!(
        ScanlineEncoding::detect([scanline[0], scanline[1], scanline[2], scanline[3]]),
        ScanlineEncoding::NewRle { .. }
    );
    starts_like_rle
        || scanline
            .chunks_exact(4)
            .any(|px| px[0] == 1 && px[1] == 1 && px[2] == 1)
}

/// Appends new-style packets for one channel plane.
fn encode_rle_channel(data: &[u8], out: &mut Vec<u8>) {
    let run_at = |i: usize| {
        let mut run = 1usize;
        while i + run < data.len() && run < MAX_RUN && data[i] == data[i + run] {
            run += 1;
        }
        run
    };

    let mut i = 0usize;
    while i < data.len() {
        let run = run_at(i);
        if run >= MIN_RUN {
            out.push((128 + run) as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < data.len() && i - start < MAX_LITERAL && run_at(i) < MIN_RUN {
            i += 1;
        }
        out.push((i - start) as u8);
        out.extend_from_slice(&data[start..i]);
    }
}

/// Rejects header text that would add lines or split a field on read.
fn check_header_text(options: &EncodeOptions) -> HdrResult<()> {
    let breaks_line = |s: &str| s.contains(['\n', '\r']);
    if breaks_line(&options.program) {
        return Err(HdrError::Encode(format!(
            "program id {:?} contains a line break",
            options.program
        )));
    }
    for (key, value) in &options.fields {
        if breaks_line(key) || key.contains('=') {
            return Err(HdrError::Encode(format!("invalid header field name {:?}", key)));
        }
        if breaks_line(value) {
            return Err(HdrError::Encode(format!(
                "header field {} value {:?} contains a line break",
                key, value
            )));
        }
    }
    Ok(())
}

fn write_header_field<W: Write>(writer: &mut W, key: &str, value: &str) -> HdrResult<()> {
    writeln!(writer, "{}={}", key, value)?;
    Ok(())
}
